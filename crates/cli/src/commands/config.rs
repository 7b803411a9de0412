//! `config show|set|unset`.

use std::path::PathBuf;

use crate::context::CommandContext;
use crate::error::{CliError, Result};
use crate::output::{ResultBuilder, SettingsData, print_result};
use crate::settings::Overrides;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SettingKey {
	Hostname,
	Port,
	UseHttps,
	ShowWorkers,
	IconCacheDir,
}

impl SettingKey {
	fn parse(key: &str) -> Result<Self> {
		match key.to_ascii_lowercase().replace(['-', '_'], "").as_str() {
			"hostname" | "host" => Ok(SettingKey::Hostname),
			"port" => Ok(SettingKey::Port),
			"usehttps" | "https" => Ok(SettingKey::UseHttps),
			"showworkers" => Ok(SettingKey::ShowWorkers),
			"iconcachedir" | "icondir" => Ok(SettingKey::IconCacheDir),
			_ => Err(CliError::InvalidInput(format!(
				"unknown setting '{key}' (expected hostname, port, useHttps, showWorkers or iconCacheDir)"
			))),
		}
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
	match value.to_ascii_lowercase().as_str() {
		"true" | "yes" | "on" | "1" => Ok(true),
		"false" | "no" | "off" | "0" => Ok(false),
		_ => Err(CliError::InvalidInput(format!("{key} expects true or false, got '{value}'"))),
	}
}

fn parse_assignment(key: &str, value: &str) -> Result<Overrides> {
	let mut changes = Overrides::default();
	match SettingKey::parse(key)? {
		SettingKey::Hostname => {
			let value = value.trim();
			if value.is_empty() {
				return Err(CliError::InvalidInput("hostname must not be empty".into()));
			}
			changes.hostname = Some(value.to_string());
		}
		SettingKey::Port => {
			let port = value
				.parse::<u16>()
				.ok()
				.filter(|p| *p != 0)
				.ok_or_else(|| CliError::InvalidInput(format!("port expects 1-65535, got '{value}'")))?;
			changes.port = Some(port);
		}
		SettingKey::UseHttps => changes.use_https = Some(parse_bool(key, value)?),
		SettingKey::ShowWorkers => changes.show_workers = Some(parse_bool(key, value)?),
		SettingKey::IconCacheDir => changes.icon_cache_dir = Some(PathBuf::from(value)),
	}
	Ok(changes)
}

fn print_settings(ctx: &CommandContext, command: &str, saved: bool) {
	let data = SettingsData {
		path: ctx.settings.path().to_path_buf(),
		settings: ctx.settings.settings.clone(),
		saved,
	};
	print_result(&ResultBuilder::new(command).data(data).build(), ctx.format);
}

pub fn show(ctx: &CommandContext) -> Result<()> {
	print_settings(ctx, "config show", false);
	Ok(())
}

pub fn set(ctx: &mut CommandContext, key: &str, value: &str) -> Result<()> {
	let changes = parse_assignment(key, value)?;
	ctx.settings.update(changes);
	ctx.settings.save()?;
	print_settings(ctx, "config set", true);
	Ok(())
}

pub fn unset(ctx: &mut CommandContext, key: &str) -> Result<()> {
	let settings = &mut ctx.settings.settings;
	match SettingKey::parse(key)? {
		SettingKey::Hostname => settings.hostname = None,
		SettingKey::Port => settings.port = None,
		SettingKey::UseHttps => settings.use_https = None,
		SettingKey::ShowWorkers => settings.show_workers = None,
		SettingKey::IconCacheDir => settings.icon_cache_dir = None,
	}
	ctx.settings.save()?;
	print_settings(ctx, "config unset", true);
	Ok(())
}
