/// Classification a record received in the latest diff pass
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    Created,
    Unchanged,
    Updated,
    Deleted,
}

impl Lifecycle {
    /// True for the transitions that come with freshly fetched geometry
    pub fn has_new_geometry(&self) -> bool {
        matches!(self, Lifecycle::Created | Lifecycle::Updated)
    }

    pub fn is_live(&self) -> bool {
        !matches!(self, Lifecycle::Deleted)
    }
}
