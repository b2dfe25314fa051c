/// Data layer: trace types, loading, concentration labelling and merging.
///
/// Architecture:
/// ```text
///  .txt  (t,E,I  or  whitespace columns)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse file → Trace
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐    ┌───────────────┐
///   │ TraceSet  │◄───│ concentration │  label → mM (auto or manual)
///   └──────────┘    └───────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  overlay  │  outer join on E → wide table
///   └──────────┘
/// ```

pub mod concentration;
pub mod loader;
pub mod model;
pub mod overlay;
