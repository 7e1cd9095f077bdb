//! Generic CMDB resource lifecycle
//!
//! Every FortiOS resource is the same four calls against a different object
//! path, so one [`CmdbResource`] drives them all from a [`ResourceDefinition`].

use crate::api::{cmdb_path, CmdbClient};
use crate::config::ProviderConfig;
use crate::error::{Error, Result};
use fortimap::{
    validate, Expander, FieldCodec, Flattener, LocalRecord, MapError, MergeMode, NumericPolicy,
    ObjectSchema, Record, SortMode, Value,
};
use std::sync::Arc;

/// Arguments that steer the provider and are never sent to the device
pub const META_FIELDS: [&str; 3] = ["vdomparam", "get_all_tables", "dynamic_sort_subtable"];

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceOptions {
    pub vdom: Option<String>,
    pub merge_mode: MergeMode,
    pub sort_mode: SortMode,
}

impl ResourceOptions {
    pub fn from_local(local: &LocalRecord) -> std::result::Result<Self, MapError> {
        let vdom = local
            .get("vdomparam")
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let merge_mode = match flag(local, "get_all_tables") {
            Some(raw) => MergeMode::from_flag(&raw)?,
            None => MergeMode::default(),
        };

        let sort_mode = match flag(local, "dynamic_sort_subtable") {
            Some(raw) => SortMode::from_flag(&raw)?,
            None => SortMode::default(),
        };

        Ok(Self {
            vdom,
            merge_mode,
            sort_mode,
        })
    }
}

fn flag(local: &LocalRecord, name: &str) -> Option<String> {
    match local.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// How `delete` gets rid of an object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteMode {
    /// Issue a real DELETE for the mkey
    Remove,
    /// Singletons cannot be deleted; every managed field is reset with null
    Clear,
}

#[derive(Debug)]
pub struct ResourceDefinition {
    pub type_name: &'static str,
    pub schema: ObjectSchema,
    pub delete_mode: DeleteMode,
}

impl ResourceDefinition {
    /// Singleton schemas are cleared on delete, everything else is removed
    pub fn new(type_name: &'static str, schema: ObjectSchema) -> Self {
        let delete_mode = if schema.is_singleton() {
            DeleteMode::Clear
        } else {
            DeleteMode::Remove
        };
        Self {
            type_name,
            schema,
            delete_mode,
        }
    }

    pub fn path(&self) -> String {
        cmdb_path(&self.schema.name)
    }
}

pub struct CmdbResource {
    definition: &'static ResourceDefinition,
    client: Arc<dyn CmdbClient>,
    config: Arc<ProviderConfig>,
}

impl CmdbResource {
    pub fn new(
        definition: &'static ResourceDefinition,
        client: Arc<dyn CmdbClient>,
        config: Arc<ProviderConfig>,
    ) -> Self {
        Self {
            definition,
            client,
            config,
        }
    }

    pub fn definition(&self) -> &'static ResourceDefinition {
        self.definition
    }

    fn schema(&self) -> &ObjectSchema {
        &self.definition.schema
    }

    fn vdom<'a>(&'a self, options: &'a ResourceOptions) -> Option<&'a str> {
        options.vdom.as_deref().or(self.config.vdom.as_deref())
    }

    /// Singletons are addressed by path alone
    fn object_mkey<'a>(&self, mkey: &'a str) -> Option<&'a str> {
        if self.schema().is_singleton() {
            None
        } else {
            Some(mkey)
        }
    }

    fn codec() -> FieldCodec {
        FieldCodec::new(NumericPolicy::ParseStrings)
    }

    fn payload(&self, local: &LocalRecord, clear: bool, version: Option<&str>) -> Result<Record> {
        let mut expander = Expander::new(self.schema())
            .clear(clear)
            .skip_computed(true)
            .codec(Self::codec());
        if let Some(version) = version {
            expander = expander.version(version);
        }
        Ok(expander.expand(local)?)
    }

    /// Creates the object and returns its mkey
    pub async fn create(&self, local: &LocalRecord) -> Result<String> {
        let options = ResourceOptions::from_local(local)?;
        validate(local, self.schema())?;

        let local = self.schema().apply_defaults(local);
        let version = self.client.version().await;
        let payload = self.payload(&local, false, version.as_deref())?;
        let path = self.definition.path();

        tracing::debug!("Creating {} at {}", self.definition.type_name, path);

        let mkey = if self.schema().is_singleton() {
            self.client
                .update(&path, None, &payload, self.vdom(&options))
                .await?;
            self.schema().mkey_of(&local)
        } else {
            let assigned = self
                .client
                .create(&path, &payload, self.vdom(&options))
                .await?;
            assigned.or_else(|| self.schema().mkey_of(&local))
        };

        let mkey = mkey.ok_or_else(|| Error::MissingMkey(self.definition.type_name.to_string()))?;
        tracing::info!("Created {} {}", self.definition.type_name, mkey);
        Ok(mkey)
    }

    /// `Ok(None)` when the object no longer exists on the device
    pub async fn read(&self, mkey: &str, prior: &LocalRecord) -> Result<Option<LocalRecord>> {
        let options = ResourceOptions::from_local(prior)?;
        let fetched = self
            .fetch(
                mkey,
                options.merge_mode,
                options.sort_mode,
                Some(prior),
                self.vdom(&options),
            )
            .await?;
        let mut local = match fetched {
            Some(local) => local,
            None => return Ok(None),
        };

        for meta in META_FIELDS {
            if let Some(value) = prior.get(meta) {
                local.insert(meta, value.clone());
            }
        }
        Ok(Some(local))
    }

    async fn fetch(
        &self,
        mkey: &str,
        merge_mode: MergeMode,
        sort_mode: SortMode,
        prior: Option<&LocalRecord>,
        vdom: Option<&str>,
    ) -> Result<Option<LocalRecord>> {
        let path = self.definition.path();
        let remote = match self.client.read(&path, self.object_mkey(mkey), vdom).await? {
            Some(remote) => remote,
            None => {
                tracing::warn!(
                    "{} {} not found on device, removing from state",
                    self.definition.type_name,
                    mkey
                );
                return Ok(None);
            }
        };

        let version = self.client.version().await;
        let mut flattener = Flattener::new(self.schema())
            .merge(merge_mode, prior)
            .sort(sort_mode)
            .codec(Self::codec());
        if let Some(version) = version.as_deref() {
            flattener = flattener.version(version);
        }

        Ok(Some(flattener.flatten(&remote)?))
    }

    pub async fn update(&self, mkey: &str, local: &LocalRecord) -> Result<()> {
        let options = ResourceOptions::from_local(local)?;
        validate(local, self.schema())?;

        let version = self.client.version().await;
        let payload = self.payload(local, false, version.as_deref())?;

        tracing::debug!("Updating {} {}", self.definition.type_name, mkey);
        self.client
            .update(
                &self.definition.path(),
                self.object_mkey(mkey),
                &payload,
                self.vdom(&options),
            )
            .await?;
        Ok(())
    }

    pub async fn delete(&self, mkey: &str, local: &LocalRecord) -> Result<()> {
        let options = ResourceOptions::from_local(local)?;
        let path = self.definition.path();

        match self.definition.delete_mode {
            DeleteMode::Remove => {
                tracing::debug!("Deleting {} {}", self.definition.type_name, mkey);
                self.client
                    .delete(&path, self.object_mkey(mkey), self.vdom(&options))
                    .await?;
            }
            DeleteMode::Clear => {
                tracing::debug!("Clearing {} {}", self.definition.type_name, mkey);
                let version = self.client.version().await;
                let payload = self.payload(local, true, version.as_deref())?;
                self.client
                    .update(&path, self.object_mkey(mkey), &payload, self.vdom(&options))
                    .await?;
            }
        }

        tracing::info!("Deleted {} {}", self.definition.type_name, mkey);
        Ok(())
    }

    /// Reads an object that has no local configuration yet
    ///
    /// With table import on, every table the device reports is pulled in.
    /// Otherwise the read is selective against an empty prior, so only
    /// scalar fields come across.
    pub async fn import(&self, mkey: &str) -> Result<LocalRecord> {
        let empty = Record::new();
        let (mode, prior) = if self.config.import_table {
            (MergeMode::ImportAll, None)
        } else {
            (MergeMode::SelectiveRefresh, Some(&empty))
        };

        self.fetch(mkey, mode, SortMode::Off, prior, self.config.vdom.as_deref())
            .await?
            .ok_or_else(|| Error::NotFound(format!("{} {}", self.definition.type_name, mkey)))
    }
}
