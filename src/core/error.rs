use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("min_digits must be at least 1")]
    ZeroMinDigits,
    #[error("strict_digits ({strict}) must not be below min_digits ({min})")]
    StrictDigitsBelowMin { strict: usize, min: usize },
    #[error("max_digits ({max}) must not be below min_digits ({min})")]
    MaxDigitsBelowMin { max: usize, min: usize },
    #[error("name length bounds [{min}, {max}] are empty or start at zero")]
    NameBounds { min: usize, max: usize },
    #[error("min_letter_ratio must be within [0, 1], got {0}")]
    LetterRatio(f32),
    #[error("confusion '{from}' -> '{to}' must map a non-digit to an ASCII digit")]
    Confusion { from: char, to: char },
    #[error("max_images must be at least 1")]
    ZeroMaxImages,
}

#[derive(Debug, Error, PartialEq)]
pub enum BatchError {
    #[error("batch has {count} images, at most {max} are accepted per run")]
    TooManyImages { count: usize, max: usize },
    #[error("batch contains no images")]
    Empty,
}
