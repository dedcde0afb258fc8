use super::binder::bind_token_field;
use super::config::TokenConfig;
use super::generator::{SecureRandomGenerator, TokenGenerator};
use super::runtime;
use super::spec::{TokenFieldOptions, TokenFieldSpec};
use crate::core::{Result, TokenError};
use crate::lifecycle::{LifecycleEvent, LifecycleHooks};
use crate::record::{Record, RecordUpdate};
use log::warn;
use std::fmt;
use std::sync::Arc;

/// Token fields declared on one record type.
///
/// Each declaration is validated immediately and bound to the record type's
/// lifecycle hooks. Redeclaring an attribute replaces both its spec and its
/// binding.
#[derive(Clone)]
pub struct SecureTokens {
    config: TokenConfig,
    generator: Arc<dyn TokenGenerator>,
    fields: Vec<TokenFieldSpec>,
}

impl Default for SecureTokens {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecureTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureTokens")
            .field("config", &self.config)
            .field("fields", &self.fields)
            .finish()
    }
}

impl SecureTokens {
    pub fn new() -> Self {
        Self::with_generator(SecureRandomGenerator::shared())
    }

    pub fn with_generator(generator: Arc<dyn TokenGenerator>) -> Self {
        Self {
            config: TokenConfig::default(),
            generator,
            fields: Vec::new(),
        }
    }

    pub fn with_config(config: TokenConfig, generator: Arc<dyn TokenGenerator>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            generator,
            fields: Vec::new(),
        })
    }

    pub fn config(&self) -> &TokenConfig {
        &self.config
    }

    pub fn generator(&self) -> Arc<dyn TokenGenerator> {
        Arc::clone(&self.generator)
    }

    /// Builds the field a declaration would produce, without registering it.
    pub fn resolve(
        &self,
        attribute: impl Into<String>,
        options: TokenFieldOptions,
    ) -> Result<TokenFieldSpec> {
        TokenFieldSpec::new(
            attribute,
            options.length.unwrap_or(self.config.default_length),
            options.trigger.unwrap_or(self.config.default_trigger),
        )
    }

    /// Validates and registers a token field, binding its generation hook.
    ///
    /// Nothing is registered when validation fails.
    pub fn declare<R, H>(
        &mut self,
        hooks: &mut H,
        attribute: impl Into<String>,
        options: TokenFieldOptions,
    ) -> Result<&TokenFieldSpec>
    where
        R: Record,
        H: LifecycleHooks<R> + ?Sized,
    {
        let spec = self.resolve(attribute, options)?;
        self.register::<R, H>(hooks, spec)
    }

    /// Registers an already validated spec, replacing any field with the same
    /// attribute.
    pub fn register<R, H>(&mut self, hooks: &mut H, spec: TokenFieldSpec) -> Result<&TokenFieldSpec>
    where
        R: Record,
        H: LifecycleHooks<R> + ?Sized,
    {
        if let Some(previous) = bind_token_field::<R, H>(hooks, &spec, self.generator()) {
            warn!(
                "token field {}.{} redeclared, replacing {} binding with {}",
                R::type_name(),
                spec.attribute(),
                previous,
                LifecycleEvent::from(spec.trigger())
            );
        }

        let existing = self
            .fields
            .iter()
            .position(|field| field.attribute() == spec.attribute());
        let index = match existing {
            Some(index) => {
                self.fields[index] = spec;
                index
            }
            None => {
                self.fields.push(spec);
                self.fields.len() - 1
            }
        };

        Ok(&self.fields[index])
    }

    pub fn field(&self, attribute: &str) -> Option<&TokenFieldSpec> {
        self.fields.iter().find(|field| field.attribute() == attribute)
    }

    pub fn fields(&self) -> &[TokenFieldSpec] {
        &self.fields
    }

    pub fn contains(&self, attribute: &str) -> bool {
        self.field(attribute).is_some()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Assigns a fresh token to `attribute` and persists `record` through
    /// `persister`.
    pub fn regenerate<R, P>(&self, record: &mut R, attribute: &str, persister: &P) -> Result<String>
    where
        R: Record,
        P: RecordUpdate<R> + ?Sized,
    {
        let spec = self
            .field(attribute)
            .ok_or_else(|| TokenError::UnknownTokenField {
                type_name: R::type_name().to_string(),
                attribute: attribute.to_string(),
            })?;

        runtime::regenerate(record, spec, self.generator.as_ref(), persister)
    }

    /// Generates a token with this registry's generator.
    pub fn generate(&self, length: usize) -> Result<String> {
        self.generator.generate(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::HookRegistry;
    use crate::token::Trigger;

    crate::secure_token_record! {
        struct Account {
            token: Option<String>,
            auth_token: Option<String>,
        }
    }

    #[test]
    fn test_declare_binds_hook() {
        let mut hooks = HookRegistry::<Account>::new();
        let mut tokens = SecureTokens::new();

        let spec = tokens
            .declare::<Account, _>(&mut hooks, "token", TokenFieldOptions::default())
            .unwrap();
        assert_eq!(spec.length(), 24);
        assert_eq!(spec.trigger(), Trigger::BeforeFirstPersistence);
        assert_eq!(
            hooks.event_of("secure_token:token"),
            Some(LifecycleEvent::BeforeCreate)
        );
    }

    #[test]
    fn test_declare_short_length_registers_nothing() {
        let mut hooks = HookRegistry::<Account>::new();
        let mut tokens = SecureTokens::new();

        let err = tokens
            .declare::<Account, _>(&mut hooks, "token", TokenFieldOptions::new().length(12))
            .unwrap_err();
        assert!(matches!(err, TokenError::MinimumLength { length: 12, .. }));
        assert!(tokens.is_empty());
        assert!(hooks.is_empty());
    }

    #[test]
    fn test_redeclare_replaces_spec_and_binding() {
        let mut hooks = HookRegistry::<Account>::new();
        let mut tokens = SecureTokens::new();

        tokens
            .declare::<Account, _>(&mut hooks, "token", TokenFieldOptions::default())
            .unwrap();
        tokens
            .declare::<Account, _>(&mut hooks, "auth_token", TokenFieldOptions::new().length(36))
            .unwrap();
        tokens
            .declare::<Account, _>(
                &mut hooks,
                "token",
                TokenFieldOptions::new().length(30).on(Trigger::OnConstruction),
            )
            .unwrap();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens.fields()[0].attribute(), "token");
        assert_eq!(tokens.field("token").unwrap().length(), 30);
        assert_eq!(hooks.len(), 2);
        assert_eq!(
            hooks.event_of("secure_token:token"),
            Some(LifecycleEvent::AfterInitialize)
        );
        assert_eq!(
            hooks.keys_for(LifecycleEvent::BeforeCreate),
            vec!["secure_token:auth_token"]
        );
    }

    #[test]
    fn test_config_defaults_apply() {
        let config = TokenConfig::new()
            .default_length(40)
            .default_trigger(Trigger::OnConstruction);
        let tokens = SecureTokens::with_config(config, SecureRandomGenerator::shared()).unwrap();

        let spec = tokens.resolve("token", TokenFieldOptions::default()).unwrap();
        assert_eq!(spec.length(), 40);
        assert_eq!(spec.trigger(), Trigger::OnConstruction);

        let spec = tokens
            .resolve("token", TokenFieldOptions::new().length(24))
            .unwrap();
        assert_eq!(spec.length(), 24);
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = TokenConfig::new().default_length(10);
        let err = SecureTokens::with_config(config, SecureRandomGenerator::shared()).unwrap_err();
        assert!(matches!(err, TokenError::InvalidConfig(_)));
    }

    #[test]
    fn test_bound_hook_generates_only_when_blank() {
        let mut hooks = HookRegistry::<Account>::new();
        let mut tokens = SecureTokens::new();
        tokens
            .declare::<Account, _>(&mut hooks, "auth_token", TokenFieldOptions::new().length(36))
            .unwrap();

        let mut account = Account::default();
        account.set_auth_token(Some(String::new()));
        hooks.run(LifecycleEvent::BeforeCreate, &mut account).unwrap();
        let generated = account.auth_token().clone().unwrap();
        assert_eq!(generated.len(), 36);

        hooks.run(LifecycleEvent::BeforeCreate, &mut account).unwrap();
        assert_eq!(account.auth_token().as_deref(), Some(generated.as_str()));
        assert_eq!(account.token(), &None);
    }

    #[test]
    fn test_bound_hook_skips_persisted_records() {
        let mut hooks = HookRegistry::<Account>::new();
        let mut tokens = SecureTokens::new();
        tokens
            .declare::<Account, _>(
                &mut hooks,
                "token",
                TokenFieldOptions::new().on(Trigger::OnConstruction),
            )
            .unwrap();

        let mut account = Account::default();
        account.metadata_mut().persisted = true;
        hooks.run(LifecycleEvent::AfterInitialize, &mut account).unwrap();
        assert_eq!(account.token(), &None);

        account.metadata_mut().persisted = false;
        hooks.run(LifecycleEvent::AfterInitialize, &mut account).unwrap();
        assert_eq!(account.token().as_deref().map(str::len), Some(24));
    }
}
