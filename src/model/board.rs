use super::task::{Status, Task};

/// Local mirror of the `tasks` collection, in fetch/insertion order
#[derive(Debug, Clone, Default)]
pub struct Board {
    pub tasks: Vec<Task>,
}

impl Board {
    pub fn new(tasks: Vec<Task>) -> Self {
        Board { tasks }
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id.as_deref() == Some(id))
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id.as_deref() == Some(id))
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id.as_deref() == Some(id))
    }

    /// Tasks in one column, in board order
    pub fn column(&self, status: Status) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.status == status)
    }

    /// Tasks in one column that match a search query
    pub fn column_matching<'a>(
        &'a self,
        status: Status,
        query: &'a str,
    ) -> impl Iterator<Item = &'a Task> {
        self.column(status).filter(move |t| t.matches(query))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
