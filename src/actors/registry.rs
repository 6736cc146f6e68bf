use super::descriptor::ActorDescriptor;
use crate::core::{Result, SpawnError};
use crate::protocol::ActorSystemSpec;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Immutable set of actor descriptors known to this process.
///
/// Names are matched case-insensitively. A spawned actor whose own name is
/// not registered resolves through its parent's name.
#[derive(Debug, Default, Clone)]
pub struct ActorRegistry {
    descriptors: Vec<Arc<ActorDescriptor>>,
    by_name: HashMap<String, usize>,
}

impl ActorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_descriptors(descriptors: impl IntoIterator<Item = ActorDescriptor>) -> Result<Self> {
        let mut registry = Self::new();
        for descriptor in descriptors {
            registry.register(descriptor)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, descriptor: ActorDescriptor) -> Result<()> {
        descriptor.validate()?;
        let key = descriptor.name().to_lowercase();
        if self.by_name.contains_key(&key) {
            return Err(SpawnError::Config(format!(
                "actor '{}' is registered twice",
                descriptor.name()
            )));
        }
        self.by_name.insert(key, self.descriptors.len());
        self.descriptors.push(Arc::new(descriptor));
        Ok(())
    }

    pub fn with(mut self, descriptor: ActorDescriptor) -> Result<Self> {
        self.register(descriptor)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ActorDescriptor>> {
        self.by_name
            .get(&name.to_lowercase())
            .and_then(|idx| self.descriptors.get(*idx))
    }

    /// Descriptor for `name`, falling back to `parent` when `name` is unknown.
    pub fn resolve(&self, name: &str, parent: Option<&str>) -> Option<&Arc<ActorDescriptor>> {
        self.get(name)
            .or_else(|| parent.filter(|p| !p.is_empty()).and_then(|p| self.get(p)))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ActorDescriptor>> {
        self.descriptors.iter()
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Actor system description sent to the fabric at startup.
    pub fn to_system_spec(&self, system: &str) -> ActorSystemSpec {
        let actors: BTreeMap<_, _> = self
            .descriptors
            .iter()
            .map(|d| (d.name().to_string(), d.to_definition(system)))
            .collect();
        ActorSystemSpec {
            name: system.to_string(),
            actors,
        }
    }
}
