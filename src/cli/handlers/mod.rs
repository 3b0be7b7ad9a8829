//! One module per subcommand, each exposing `run`

pub mod migrate;
pub mod seed;
pub mod serve;
