use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// A listed item plus what the viewer may do with it.
#[derive(Debug, Serialize)]
pub struct Row<T: Serialize> {
    #[serde(flatten)]
    pub item: T,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl<T: Serialize> Row<T> {
    pub fn new(item: T, can_edit: bool, can_delete: bool) -> Self {
        Self { item, can_edit, can_delete }
    }
}
