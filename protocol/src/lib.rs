use thiserror::Error;

pub mod client;
pub mod server;

pub use client::{ClientEvent, parse_client_event};
pub use server::{
    BattleId, BattleMode, BattleSnapshot, BattleStatus, CombatantSnapshot, ErrorCode, LogEntry,
    MoveSnapshot, ServerEvent, Side, Stats, parse_server_event,
};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Invalid message format: {0}")]
    InvalidFormat(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Empty message")]
    EmptyMessage,
}
