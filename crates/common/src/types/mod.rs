use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct Health {
    pub status: &'static str,
}

/// Generic confirmation body for mutations that do not echo a record.
#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Confirmation {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
}

impl Confirmation {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), id: None, deleted: None }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_deleted(mut self, deleted: usize) -> Self {
        self.deleted = Some(deleted);
        self
    }
}
