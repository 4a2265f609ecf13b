/*!
# Builtin Function Registry

Four pure-function families back the builtin selection calls:

- **Aggregate** - SUM, AVG, MAX, MIN, COUNT, LISTAGG, ARRAY, JSON, ANY, RANDOM,
  MEDIAN, COUNT_DISTINCT
- **Ranking** - RANK, DENSE_RANK, NTILE, PERCENT_RANK, CUME_DIST,
  PERCENTILE_DIST, PERCENTILE_CONT (require a window ORDER BY)
- **Position** - LEAD, LAG, FIRST_VALUE, LAST_VALUE, NTH_VALUE (require a
  window ORDER BY)
- **Statistical** - STDDEV_POP, STDDEV_SAMP, VAR_POP, VAR_SAMP (plus the
  STDDEV and VARIANCE aliases)

`ROW_NUMBER` is handled on its own ahead of the families. Names are resolved
once, when a selection string is parsed, against an immutable table built on
first use and shared by every query.
*/

pub mod aggregate;
pub mod position;
pub mod ranking;
pub mod statistical;

pub use aggregate::AggregateFunction;
pub use position::PositionFunction;
pub use ranking::{RankingFunction, RankingInput};
pub use statistical::StatisticalFunction;

use std::collections::HashMap;
use std::sync::OnceLock;

/// A resolved builtin function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinFunction {
    RowNumber,
    Aggregate(AggregateFunction),
    Ranking(RankingFunction),
    Position(PositionFunction),
    Statistical(StatisticalFunction),
}

impl BuiltinFunction {
    /// Resolve an uppercase builtin name
    pub fn lookup(name: &str) -> Option<BuiltinFunction> {
        registry().get(name).copied()
    }

    /// Collapses a row-group into a single value (aggregate or statistical)
    pub fn is_group_aggregate(&self) -> bool {
        matches!(
            self,
            BuiltinFunction::Aggregate(_) | BuiltinFunction::Statistical(_)
        )
    }

    /// Needs an ORDER BY on the effective window
    pub fn requires_order_by(&self) -> bool {
        matches!(
            self,
            BuiltinFunction::Ranking(_) | BuiltinFunction::Position(_)
        )
    }
}

/// Every registered builtin name, sorted
pub fn registered_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = registry().keys().copied().collect();
    names.sort_unstable();
    names
}

/// Families are registered in dispatch priority order; an earlier family
/// keeps a name if a later one also defines it.
fn registry() -> &'static HashMap<&'static str, BuiltinFunction> {
    static REGISTRY: OnceLock<HashMap<&'static str, BuiltinFunction>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map = HashMap::new();
        map.insert("ROW_NUMBER", BuiltinFunction::RowNumber);
        for (name, f) in AggregateFunction::ALL {
            map.entry(*name).or_insert(BuiltinFunction::Aggregate(*f));
        }
        for (name, f) in RankingFunction::ALL {
            map.entry(*name).or_insert(BuiltinFunction::Ranking(*f));
        }
        for (name, f) in PositionFunction::ALL {
            map.entry(*name).or_insert(BuiltinFunction::Position(*f));
        }
        for (name, f) in StatisticalFunction::ALL {
            map.entry(*name).or_insert(BuiltinFunction::Statistical(*f));
        }
        map
    })
}
