/// Counters collected over one import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub processed: usize,
    pub users_created: usize,
    pub users_existing: usize,
    pub roles_created: usize,
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} user(s) processed, {} created, {} already present, {} role(s) created",
            self.processed, self.users_created, self.users_existing, self.roles_created
        )
    }
}
