use chrono::Utc;

/// Mints creation-time ordered ids for posts, comments and notifications.
///
/// Ids are milliseconds since the Unix epoch. Two ids minted within the same
/// millisecond (or after the wall clock stepped backwards) are disambiguated
/// by bumping past the previously issued value, so ids are strictly
/// increasing for the lifetime of the minter.
#[derive(Debug, Clone, Default)]
pub struct IdMinter {
    last: u64,
}

impl IdMinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a minter that will never reissue `floor` or anything below it.
    pub fn resume_after(floor: u64) -> Self {
        Self { last: floor }
    }

    /// Next id using the system clock.
    pub fn next_id(&mut self) -> u64 {
        let now = u64::try_from(Utc::now().timestamp_millis()).unwrap_or(0);
        self.next_at(now)
    }

    /// Next id for an explicit millisecond timestamp.
    pub fn next_at(&mut self, now_millis: u64) -> u64 {
        let id = if now_millis > self.last {
            now_millis
        } else {
            self.last.saturating_add(1)
        };
        self.last = id;
        id
    }

    pub fn last_issued(&self) -> u64 {
        self.last
    }
}
