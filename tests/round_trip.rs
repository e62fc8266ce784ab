//! Store round trips: records written through the task and contact
//! operations come back unchanged after reopening the store document, and
//! the Firebase-style fixture shapes load into the expected entities.

use join::io::local::LocalStore;
use join::io::store::{Collection, fetch_typed};
use join::model::board::Board;
use join::model::contact::Contact;
use join::model::session::{SessionUser, UserRecord};
use join::model::task::{Assignee, Category, Priority, Status, Subtask, Task};
use join::ops::contact_ops::{ContactDirectory, ContactDraft, group_by_letter};
use join::ops::task_ops::{self, TaskDraft};
use pretty_assertions::assert_eq;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

/// Copy a fixture into a temp dir so writes never touch the checked-in copy
fn open_copy(name: &str) -> (tempfile::TempDir, PathBuf) {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("db.json");
    fs::copy(fixture(name), &path).unwrap();
    (tmp, path)
}

fn user() -> SessionUser {
    SessionUser::new("Anja Schulz", "anja@example.com")
}

#[test]
fn created_task_reads_back_equal() {
    let (_tmp, path) = open_copy("board.json");
    let mut store = LocalStore::open(&path).unwrap();
    let mut board = Board::default();
    task_ops::load_tasks(&mut board, &mut store).unwrap();

    let draft = TaskDraft {
        title: "Fix bug".into(),
        description: "Crash on <submit> & reload".into(),
        due_date: "2024-05-01".into(),
        priority: Priority::Low,
        category: "technical".into(),
        status: Some(Status::AwaitFeedback),
        assignees: vec![Assignee {
            name: "Eva Fischer".into(),
            color: "#1FD7C1".into(),
        }],
        subtasks: vec!["Reproduce".into(), "  ".into(), "Patch".into()],
    };
    let created = task_ops::create_task(&mut board, &mut store, &user(), &draft).unwrap();
    assert_eq!(created.subtasks.len(), 2);

    // Reopen from disk
    let mut reopened = LocalStore::open(&path).unwrap();
    let mut fresh = Board::default();
    task_ops::load_tasks(&mut fresh, &mut reopened).unwrap();
    let id = created.id.as_deref().unwrap();
    assert_eq!(fresh.get(id), Some(&created));
    assert_eq!(fresh.tasks, board.tasks);
}

#[test]
fn array_document_keeps_order_after_create_and_reopen() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("db.json");
    let tasks: Vec<serde_json::Value> = (0..12)
        .map(|i| {
            serde_json::json!({
                "title": format!("T{i}"),
                "dueDate": "2024-05-01",
                "category": "technical",
            })
        })
        .collect();
    fs::write(&path, serde_json::json!({ "tasks": tasks }).to_string()).unwrap();

    let mut store = LocalStore::open(&path).unwrap();
    let mut board = Board::default();
    task_ops::load_tasks(&mut board, &mut store).unwrap();
    let draft = TaskDraft {
        title: "NEW".into(),
        due_date: "2024-06-01".into(),
        category: "technical".into(),
        ..Default::default()
    };
    task_ops::create_task(&mut board, &mut store, &user(), &draft).unwrap();

    let mut fresh = Board::default();
    task_ops::load_tasks(&mut fresh, &mut LocalStore::open(&path).unwrap()).unwrap();
    let titles: Vec<&str> = fresh.column(Status::Todo).map(|t| t.title.as_str()).collect();
    let mut expected: Vec<String> = (0..12).map(|i| format!("T{i}")).collect();
    expected.push("NEW".into());
    assert_eq!(titles, expected);
    assert_eq!(fresh.tasks, board.tasks);
}

#[test]
fn edits_survive_reopen() {
    let (_tmp, path) = open_copy("board.json");
    let mut store = LocalStore::open(&path).unwrap();
    let mut board = Board::default();
    task_ops::load_tasks(&mut board, &mut store).unwrap();

    task_ops::move_task(&mut board, &mut store, &user(), "-NtA1", Status::Done).unwrap();
    task_ops::toggle_subtask(&mut board, &mut store, &user(), "-NtA1", 1).unwrap();

    let mut fresh = Board::default();
    task_ops::load_tasks(&mut fresh, &mut LocalStore::open(&path).unwrap()).unwrap();
    let task = fresh.get("-NtA1").unwrap();
    assert_eq!(task.status, Status::Done);
    assert_eq!(task.subtask_progress(), (2, 2));
    assert_eq!(fresh.column(Status::InProgress).count(), 0);
}

#[test]
fn fixture_shapes_normalize() {
    let mut store = LocalStore::open(&fixture("board.json")).unwrap();
    let tasks: Vec<(String, Task)> = fetch_typed(&mut store, Collection::Tasks).unwrap();
    assert_eq!(tasks.len(), 1);
    let (key, task) = &tasks[0];
    assert_eq!(key, "-NtA1");
    assert_eq!(task.category, Category::UserStory);
    assert_eq!(task.status, Status::InProgress);
    // Object-of-objects assignees become an ordered list
    assert_eq!(
        task.assignees,
        vec![Assignee {
            name: "Eva Fischer".into(),
            color: "#1FD7C1".into(),
        }]
    );
    assert_eq!(
        task.subtasks,
        vec![
            Subtask {
                title: "Implement recipe recommendation".into(),
                completed: true,
            },
            Subtask::new("Start page layout"),
        ]
    );

    let contacts: Vec<(String, Contact)> =
        fetch_typed(&mut store, Collection::Contacts).unwrap();
    let keys: Vec<&str> = contacts.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, vec!["0", "1"]);
    assert_eq!(contacts[1].1.phone, "");
}

#[test]
fn sparse_fixture_skips_holes() {
    let mut store = LocalStore::open(&fixture("sparse.json")).unwrap();
    let mut board = Board::default();
    task_ops::load_tasks(&mut board, &mut store).unwrap();
    assert_eq!(board.len(), 1);
    let task = board.get("1").unwrap();
    assert_eq!(task.category, Category::Other("Design".into()));
    assert_eq!(task.priority, Priority::Medium);
    assert_eq!(task.status, Status::Todo);
    assert!(task.assignees.is_empty());

    let mut dir = ContactDirectory::default();
    dir.load(&mut store).unwrap();
    assert_eq!(dir.contacts.len(), 1);
    assert_eq!(dir.contacts[0].id.as_deref(), Some("1"));
    assert!(fetch_typed::<UserRecord>(&mut store, Collection::Users)
        .unwrap()
        .is_empty());
}

#[test]
fn contacts_round_trip_and_group() {
    let (_tmp, path) = open_copy("board.json");
    let mut store = LocalStore::open(&path).unwrap();
    let mut dir = ContactDirectory::default();
    dir.load(&mut store).unwrap();
    let added = dir
        .add_contact(
            &mut store,
            &user(),
            &ContactDraft {
                name: "Anton Mayer".into(),
                email: "anton@example.com".into(),
                phone: String::new(),
            },
            &["#FF7A00".to_string()],
        )
        .unwrap();
    assert_eq!(added.color, "#FF7A00");

    let mut fresh = ContactDirectory::default();
    fresh.load(&mut LocalStore::open(&path).unwrap()).unwrap();
    let letters: Vec<String> = group_by_letter(&fresh.contacts).into_keys().collect();
    assert_eq!(letters, vec!["A", "B", "E"]);
    assert_eq!(fresh.get(added.id.as_deref().unwrap()), Some(&added));
}
