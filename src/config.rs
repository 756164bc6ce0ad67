//! Limits shared by the lexer and the parser.

/// The default maximum length of a single input line (16 KiB).
pub const DEFAULT_MAX_LINE_LENGTH: usize = 16 * 1024;
/// The default maximum size of the whole input (10 MiB).
pub const DEFAULT_MAX_INPUT_SIZE: usize = 10 * 1024 * 1024;
/// The default maximum nesting depth (e.g., `[[[]]]`) to prevent stack overflows.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// Resource limits applied while lexing and parsing.
///
/// ```
/// use rill_cst::Config;
///
/// let config = Config::default().max_depth(8).max_line_length(256);
/// assert_eq!(config.max_depth, 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Lines longer than this many bytes (line terminator excluded) are rejected.
    pub max_line_length: usize,
    /// Inputs larger than this many bytes are rejected.
    pub max_input_size: usize,
    /// Arrays and objects nested deeper than this are rejected.
    pub max_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            max_input_size: DEFAULT_MAX_INPUT_SIZE,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Config {
    pub fn max_line_length(mut self, bytes: usize) -> Self {
        self.max_line_length = bytes;
        self
    }

    pub fn max_input_size(mut self, bytes: usize) -> Self {
        self.max_input_size = bytes;
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}
