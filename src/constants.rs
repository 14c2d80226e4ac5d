pub mod cache {

    pub const SEARCH_TTL_MINUTES: i64 = 10;

    pub const ENTITY_VOLATILE_TTL_HOURS: i64 = 24;

    pub const ENTITY_DURABLE_TTL_DAYS: i64 = 30;
}

pub mod scan {

    /// Hard ceiling on candidates collected for local filtering. Filters
    /// applied beyond this many upstream records are partial; the outcome
    /// carries `truncated = true` when it is hit.
    pub const CANDIDATE_CEILING: usize = 5000;

    /// Largest page size the upstream search endpoints accept.
    pub const SCAN_PAGE_SIZE: u32 = 100;

    pub const PROFILE_BATCH_SIZE: usize = 5;

    pub const OFFICER_BATCH_SIZE: usize = 10;

    pub const BATCH_DELAY_MS: u64 = 200;
}

pub mod limits {

    pub const MAX_PAGE_SIZE: u32 = 100;
}

pub mod retention {

    pub const SNAPSHOT_HOURS: i64 = 24;
}
