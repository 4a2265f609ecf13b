//! Query engine configuration.
//!
//! A [`QueryConfig`] controls the few behaviors of the function library that
//! are a matter of policy rather than semantics: the LISTAGG separator, how
//! position functions treat falsy values, and the RANDOM seed.
//!
//! Configuration can be built in code, loaded from YAML, or read from the
//! environment:
//!
//! ```yaml
//! listagg_separator: ";"
//! position_falsy_as_null: true
//! random_seed: 42
//! ```

pub mod query_config;

pub use query_config::{QueryConfig, QueryConfigError, global_config};
