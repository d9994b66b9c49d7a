//! Default values and fixed limits for the quiz bowl engine
//!
//! Timing defaults feed [`crate::config::Timing`]; the `MIN_*`/`MAX_*`
//! pairs are the bounds that configuration is validated against.
//! Scoring weights are fixed by quiz bowl convention and are not
//! configurable.

/// Chat front-end constants
pub mod bot {
    /// Default command prefix
    pub const PREFIX: &str = ">";
    /// Base URL of the QB Reader API
    pub const API_BASE: &str = "https://www.qbreader.org/api";
    /// Timeout in milliseconds for a single request to the API
    pub const REQUEST_TIMEOUT_MS: u64 = 10_000;
    /// Maximum length of a command prefix
    pub const MAX_PREFIX_LENGTH: usize = 8;
    /// Messages starting with this character are ignored while a bonus part waits for an answer
    pub const CHATTER_PREFIX: char = '_';
}

/// Tossup reading and buzzing constants
pub mod tossup {
    /// Words added to the displayed text per reveal step
    pub const CHUNK_SIZE: usize = 5;
    /// Minimum chunk size
    pub const MIN_CHUNK_SIZE: usize = 1;
    /// Maximum chunk size
    pub const MAX_CHUNK_SIZE: usize = 50;
    /// Delay in milliseconds before each reveal step
    pub const REVEAL_DELAY_MS: u64 = 800;
    /// Minimum reveal delay in milliseconds
    pub const MIN_REVEAL_DELAY_MS: u64 = 100;
    /// Maximum reveal delay in milliseconds
    pub const MAX_REVEAL_DELAY_MS: u64 = 10_000;
    /// Time in milliseconds the fully read tossup stays open for a buzz
    pub const GRACE_PERIOD_MS: u64 = 5_000;
    /// Time in milliseconds to answer after a buzz, as on protobowl
    pub const ANSWER_WINDOW_MS: u64 = 8_000;
    /// Time in milliseconds a `tk` session waits for an end command between tossups
    pub const END_PROBE_MS: u64 = 3_200;
    /// Maximum for any tossup window in milliseconds
    pub const MAX_WINDOW_MS: u64 = 120_000;
    /// Token marking the end of the power portion of a tossup
    pub const POWER_MARK: &str = "(*)";
}

/// Bonus constants
pub mod bonus {
    /// Time in milliseconds to answer a single bonus part
    pub const PART_WINDOW_MS: u64 = 60_000;
    /// Maximum bonus part window in milliseconds
    pub const MAX_PART_WINDOW_MS: u64 = 600_000;
}

/// Point values
pub mod scoring {
    /// Correct buzz before the power mark
    pub const POWER: i64 = 15;
    /// Correct buzz after the power mark
    pub const CORRECT: i64 = 10;
    /// Incorrect buzz before the tossup finished reading
    pub const NEG: i64 = -5;
    /// Correct bonus part
    pub const BONUS_PART: u64 = 10;
    /// Tossups heard that a rate is normalized to
    pub const RATE_BASIS: f64 = 20.;
}

/// Question difficulty constants
pub mod difficulty {
    /// Lowest difficulty (unrated)
    pub const MIN: u8 = 0;
    /// Highest difficulty (open)
    pub const MAX: u8 = 10;
}
