//! Record lifecycle and persistence for one record type.

use crate::core::{Result, StorageError, TokenError};
use crate::lifecycle::{HookRegistry, LifecycleEvent};
use crate::record::{Record, RecordUpdate};
use crate::storage::{RecordState, RecordStore};
use crate::token::{SecureTokens, TokenConfig, TokenFieldOptions, TokenFieldSpec, TokenGenerator};
use chrono::Utc;
use std::fmt;
use std::sync::Arc;
use tracing::{Level, event, info_span};
use uuid::Uuid;

/// Drives construction, persistence and token generation for records of type `R`.
///
/// Token fields are declared once on the model; afterwards the model can be
/// shared between threads.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use persist_token::{InMemoryRecordStore, RecordModel, secure_token_record};
///
/// secure_token_record! {
///     pub struct User {
///         name: String,
///         token: Option<String>,
///     }
/// }
///
/// # fn main() -> persist_token::Result<()> {
/// let mut users = RecordModel::<User>::new(Arc::new(InMemoryRecordStore::new()));
/// users.has_secure_token("token")?;
///
/// let mut user = users.new_record()?;
/// users.save(&mut user)?;
/// assert_eq!(user.token().as_deref().map(str::len), Some(24));
/// # Ok(())
/// # }
/// ```
pub struct RecordModel<R: Record> {
    store: Arc<dyn RecordStore>,
    hooks: HookRegistry<R>,
    tokens: SecureTokens,
}

impl<R: Record> fmt::Debug for RecordModel<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordModel")
            .field("type_name", &R::type_name())
            .field("hooks", &self.hooks)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl<R: Record> RecordModel<R> {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            hooks: HookRegistry::new(),
            tokens: SecureTokens::new(),
        }
    }

    pub fn with_generator(store: Arc<dyn RecordStore>, generator: Arc<dyn TokenGenerator>) -> Self {
        Self {
            store,
            hooks: HookRegistry::new(),
            tokens: SecureTokens::with_generator(generator),
        }
    }

    pub fn with_config(
        store: Arc<dyn RecordStore>,
        config: TokenConfig,
        generator: Arc<dyn TokenGenerator>,
    ) -> Result<Self> {
        Ok(Self {
            store,
            hooks: HookRegistry::new(),
            tokens: SecureTokens::with_config(config, generator)?,
        })
    }

    /// Declares a token field on `R`.
    ///
    /// Fails with [`TokenError::MinimumLength`] for lengths below 24 and with
    /// [`TokenError::UnknownAttribute`] when `R` has no such attribute, and
    /// with [`TokenError::TypeMismatch`] when the attribute cannot hold text.
    /// A failed declaration leaves the model unchanged.
    pub fn declare_token_field(
        &mut self,
        attribute: impl Into<String>,
        options: TokenFieldOptions,
    ) -> Result<TokenFieldSpec> {
        let spec = self.tokens.resolve(attribute, options)?;
        if !R::has_attribute(spec.attribute()) {
            return Err(TokenError::UnknownAttribute {
                type_name: R::type_name().to_string(),
                attribute: spec.attribute().to_string(),
            });
        }
        if !R::is_text_attribute(spec.attribute()) {
            return Err(TokenError::TypeMismatch(format!(
                "attribute '{}' of {} cannot hold a token",
                spec.attribute(),
                R::type_name()
            )));
        }

        let spec = self.tokens.register::<R, _>(&mut self.hooks, spec)?;
        Ok(spec.clone())
    }

    /// Declares a token field with the default length and trigger.
    pub fn has_secure_token(&mut self, attribute: impl Into<String>) -> Result<TokenFieldSpec> {
        self.declare_token_field(attribute, TokenFieldOptions::default())
    }

    pub fn tokens(&self) -> &SecureTokens {
        &self.tokens
    }

    pub fn hooks(&self) -> &HookRegistry<R> {
        &self.hooks
    }

    /// Lifecycle hooks of `R`, for callbacks other than token generation.
    pub fn hooks_mut(&mut self) -> &mut HookRegistry<R> {
        &mut self.hooks
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    /// Finishes construction of an in-memory record.
    pub fn build(&self, mut record: R) -> Result<R> {
        self.hooks.run(LifecycleEvent::AfterInitialize, &mut record)?;
        Ok(record)
    }

    pub fn new_record(&self) -> Result<R>
    where
        R: Default,
    {
        self.build(R::default())
    }

    /// Builds and saves a record in one step.
    pub fn create(&self, record: R) -> Result<R> {
        let mut record = self.build(record)?;
        self.save(&mut record)?;
        Ok(record)
    }

    /// Creates the record in storage if it is new, updates it otherwise.
    ///
    /// Metadata changes only once storage has accepted the write.
    pub fn save(&self, record: &mut R) -> Result<()> {
        if record.is_new_record() {
            self.insert(record)
        } else {
            self.update(record)
        }
    }

    fn insert(&self, record: &mut R) -> Result<()> {
        let span = info_span!("record.create", type_name = %R::type_name());
        let _enter = span.enter();

        self.hooks.run(LifecycleEvent::BeforeCreate, record)?;

        let now = Utc::now();
        let mut metadata = record.metadata().clone();
        let persist_id = metadata
            .persist_id
            .get_or_insert_with(|| Uuid::new_v4().to_string())
            .clone();
        metadata.version += 1;
        metadata.created_at = Some(now);
        metadata.updated_at = Some(now);
        metadata.persisted = true;

        let state = RecordState::capture(&*record, metadata.clone())?;
        if let Err(err) = self.store.insert(state) {
            event!(Level::ERROR, error = %err, "record insert failed");
            return Err(err.into());
        }

        *record.metadata_mut() = metadata;
        event!(Level::DEBUG, persist_id = %persist_id, "record created");
        Ok(())
    }

    /// Writes the current state of a stored record.
    ///
    /// New records are created instead.
    pub fn update(&self, record: &mut R) -> Result<()> {
        if record.is_new_record() {
            return self.insert(record);
        }

        let span = info_span!(
            "record.update",
            type_name = %R::type_name(),
            persist_id = record.persist_id().unwrap_or_default()
        );
        let _enter = span.enter();

        self.hooks.run(LifecycleEvent::BeforeUpdate, record)?;

        let mut metadata = record.metadata().clone();
        metadata.version += 1;
        metadata.updated_at = Some(Utc::now());

        let state = RecordState::capture(&*record, metadata.clone())?;
        if let Err(err) = self.store.update(state) {
            event!(Level::ERROR, error = %err, "record update failed");
            return Err(err.into());
        }

        *record.metadata_mut() = metadata;
        event!(Level::DEBUG, "record updated");
        Ok(())
    }

    /// Loads a stored record. Construction hooks run on the loaded instance;
    /// token fields are left as stored.
    pub fn find(&self, persist_id: &str) -> Result<R> {
        let state = self.store.fetch(R::type_name(), persist_id)?;
        self.build(state.into_record()?)
    }

    /// Replaces the in-memory record with its stored state.
    pub fn reload(&self, record: &mut R) -> Result<()> {
        let persist_id = Self::require_persist_id(record)?;
        *record = self.find(&persist_id)?;
        Ok(())
    }

    /// Removes the record from storage. The instance keeps its attributes but
    /// becomes a new record again.
    pub fn destroy(&self, record: &mut R) -> Result<()> {
        let persist_id = Self::require_persist_id(record)?;
        self.store.delete(R::type_name(), &persist_id)?;

        let metadata = record.metadata_mut();
        metadata.persist_id = None;
        metadata.persisted = false;
        Ok(())
    }

    /// Assigns a fresh token to `attribute` and saves the record.
    ///
    /// When saving fails the new token stays in memory and the storage error
    /// is returned.
    pub fn regenerate(&self, record: &mut R, attribute: &str) -> Result<String> {
        let span = info_span!(
            "record.regenerate_token",
            type_name = %R::type_name(),
            attribute = %attribute
        );
        let _enter = span.enter();

        self.tokens.regenerate(record, attribute, self)
    }

    /// Generates a token with the model's generator.
    pub fn generate_secure_token(&self, length: usize) -> Result<String> {
        self.tokens.generate(length)
    }

    fn require_persist_id(record: &R) -> Result<String> {
        record
            .persist_id()
            .map(str::to_string)
            .ok_or_else(|| {
                StorageError::NotPersisted {
                    type_name: R::type_name().to_string(),
                }
                .into()
            })
    }
}

impl<R: Record> RecordUpdate<R> for RecordModel<R> {
    fn update_record(&self, record: &mut R) -> Result<()> {
        self.save(record)
    }
}
