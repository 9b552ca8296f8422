use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("terminal is {have_w}x{have_h} but the board needs {need_w}x{need_h}; try a smaller --width/--height")]
    TerminalTooSmall {
        have_w: u16,
        have_h: u16,
        need_w: u16,
        need_h: u16,
    },
}
