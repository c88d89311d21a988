//! Value objects - immutable types that represent domain concepts

mod message_query;
mod snowflake;

pub use message_query::{MessageOrder, MessageQuery};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
