//! Source Router - Adapter Selection by Kind
//!
//! Maps each `AdapterKind` to the one `PriceSource` serving it. Built
//! once at startup; construction fails unless every kind is covered,
//! so a registered venue can always be routed.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Result, bail};

use crate::domain::AdapterKind;
use crate::ports::PriceSource;

/// Immutable kind → source table shared by the gate and the orchestrator.
#[derive(Clone)]
pub struct SourceRouter {
  sources: HashMap<AdapterKind, Arc<dyn PriceSource>>,
}

impl SourceRouter {
  /// Build the router from a set of sources.
  ///
  /// # Errors
  /// Fails if two sources claim the same kind or any kind is missing.
  pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Result<Self> {
    let mut map: HashMap<AdapterKind, Arc<dyn PriceSource>> = HashMap::new();

    for source in sources {
      let kind = source.kind();
      if map.insert(kind, source).is_some() {
        bail!("Two price sources registered for adapter kind {kind}");
      }
    }

    for kind in AdapterKind::ALL {
      if !map.contains_key(&kind) {
        bail!("No price source registered for adapter kind {kind}");
      }
    }

    Ok(Self { sources: map })
  }

  /// Source serving a kind.
  pub fn source(&self, kind: AdapterKind) -> &Arc<dyn PriceSource> {
    // Every kind is present after `new`.
    &self.sources[&kind]
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::{AdapterError, PriceQuote, Venue};
  use async_trait::async_trait;

  struct Fixed(AdapterKind);

  #[async_trait]
  impl PriceSource for Fixed {
    fn kind(&self) -> AdapterKind {
      self.0
    }

    async fn fetch(&self, _venue: &Venue) -> Result<Option<PriceQuote>, AdapterError> {
      Ok(None)
    }
  }

  fn all() -> Vec<Arc<dyn PriceSource>> {
    AdapterKind::ALL
      .into_iter()
      .map(|k| Arc::new(Fixed(k)) as Arc<dyn PriceSource>)
      .collect()
  }

  #[test]
  fn test_routes_every_kind() {
    let router = SourceRouter::new(all()).unwrap();
    for kind in AdapterKind::ALL {
      assert_eq!(router.source(kind).kind(), kind);
    }
  }

  #[test]
  fn test_missing_kind_fails_construction() {
    let mut sources = all();
    sources.pop();
    assert!(SourceRouter::new(sources).is_err());
  }

  #[test]
  fn test_duplicate_kind_fails_construction() {
    let mut sources = all();
    sources.push(Arc::new(Fixed(AdapterKind::Dom)));
    assert!(SourceRouter::new(sources).is_err());
  }
}
