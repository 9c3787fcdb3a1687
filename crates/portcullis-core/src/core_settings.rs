//! Core runtime settings registration
//!
//! Registers the configuration store keys the frontend settings snapshot is
//! built from.

use crate::prelude::*;
use crate::settings::{SettingDefinition, SettingScope, SettingValue, SettingsRegistry};

pub const AUTHENTICATION_METHODS: [&str; 3] = ["email", "ldap", "saml"];
pub const EXECUTION_MODES: [&str; 2] = ["regular", "queue"];
pub const BINARY_DATA_MODES: [&str; 3] = ["default", "filesystem", "s3"];

fn one_of(
	key: &'static str,
	allowed: &'static [&'static str],
) -> impl Fn(&SettingValue) -> ClResult<()> {
	move |value| match value {
		SettingValue::String(s) if allowed.contains(&s.as_str()) => Ok(()),
		_ => Err(Error::ValidationError(format!(
			"{} must be one of: {}",
			key,
			allowed.join(", ")
		))),
	}
}

/// Register all core settings
pub fn register_settings(registry: &mut SettingsRegistry) -> ClResult<()> {
	// User management
	registry.register(
		SettingDefinition::builder("userManagement.isInstanceOwnerSetUp")
			.description("Whether the instance owner account has been created")
			.default(SettingValue::Bool(false))
			.scope(SettingScope::Global)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("userManagement.authenticationMethod")
			.description("Login method offered to users (email, ldap or saml)")
			.default(SettingValue::String("email".into()))
			.scope(SettingScope::Global)
			.validator(one_of("userManagement.authenticationMethod", &AUTHENTICATION_METHODS))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("mfa.enabled")
			.description("Allow users to enable multi-factor authentication")
			.default(SettingValue::Bool(false))
			.scope(SettingScope::Global)
			.build()?,
	)?;

	// SSO
	registry.register(
		SettingDefinition::builder("ldap.loginLabel")
			.description("Label of the username field on the LDAP login form")
			.default(SettingValue::String(String::new()))
			.scope(SettingScope::Global)
			.build()?,
	)?;

	// Mail delivery is configured when a host is set
	registry.register(
		SettingDefinition::builder("email.smtp.host")
			.description("SMTP server host name")
			.scope(SettingScope::Global)
			.optional(true)
			.build()?,
	)?;

	// Executions and storage
	registry.register(
		SettingDefinition::builder("executions.mode")
			.description("Execution mode (regular or queue)")
			.default(SettingValue::String("regular".into()))
			.scope(SettingScope::Global)
			.validator(one_of("executions.mode", &EXECUTION_MODES))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("binaryDataManager.mode")
			.description("Storage backend for binary execution data")
			.default(SettingValue::String("default".into()))
			.scope(SettingScope::Global)
			.validator(one_of("binaryDataManager.mode", &BINARY_DATA_MODES))
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder("workflowHistory.pruneTime")
			.description("Hours to keep workflow history (-1 keeps it forever)")
			.default(SettingValue::Int(-1))
			.scope(SettingScope::Global)
			.validator(|value| match value {
				SettingValue::Int(hours) if *hours >= -1 => Ok(()),
				_ => Err(Error::ValidationError(
					"workflowHistory.pruneTime must be -1 or a number of hours".into(),
				)),
			})
			.build()?,
	)?;

	// UI state
	registry.register(
		SettingDefinition::builder("easyAIWorkflowOnboarded")
			.description("Whether the AI workflow onboarding has been completed")
			.default(SettingValue::Bool(false))
			.scope(SettingScope::Global)
			.build()?,
	)?;

	// Wildcard pattern for UI settings - e.g. ui.banners.dismissed
	registry.register(
		SettingDefinition::builder("ui.*")
			.description("User interface settings and preferences")
			.scope(SettingScope::Global)
			.optional(true)
			.build()?,
	)?;

	Ok(())
}


// vim: ts=4
