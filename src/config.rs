use std::env;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::domain::complaint::WorkflowConfig;
use crate::routing::RoutingStrategy;
use crate::utils::CircuitBreakerConfig;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub metrics_port: u16,
    pub routing_strategy: RoutingStrategy,
    pub human_id_attempts: u32,
    pub complaint_page_limit: usize,
    pub notification_page_limit: usize,
    pub push_failure_threshold: u32,
    pub push_open_secs: u64,
    pub push_success_threshold: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            metrics_port: 9090,
            routing_strategy: RoutingStrategy::EarliestActive,
            human_id_attempts: 5,
            complaint_page_limit: 10,
            notification_page_limit: 50,
            push_failure_threshold: 5,
            push_open_secs: 30,
            push_success_threshold: 2,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment; unset keys keep their defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            metrics_port: parse_or(&lookup, "METRICS_PORT", defaults.metrics_port)?,
            routing_strategy: parse_or(&lookup, "ROUTING_STRATEGY", defaults.routing_strategy)?,
            human_id_attempts: parse_or(&lookup, "HUMAN_ID_ATTEMPTS", defaults.human_id_attempts)?,
            complaint_page_limit: parse_or(&lookup, "COMPLAINT_PAGE_LIMIT", defaults.complaint_page_limit)?,
            notification_page_limit: parse_or(
                &lookup,
                "NOTIFICATION_PAGE_LIMIT",
                defaults.notification_page_limit,
            )?,
            push_failure_threshold: parse_or(&lookup, "PUSH_FAILURE_THRESHOLD", defaults.push_failure_threshold)?,
            push_open_secs: parse_or(&lookup, "PUSH_OPEN_SECS", defaults.push_open_secs)?,
            push_success_threshold: parse_or(&lookup, "PUSH_SUCCESS_THRESHOLD", defaults.push_success_threshold)?,
        })
    }

    pub fn workflow(&self) -> WorkflowConfig {
        WorkflowConfig {
            human_id_attempts: self.human_id_attempts,
            complaint_page_limit: self.complaint_page_limit,
        }
    }

    pub fn push_breaker(&self) -> CircuitBreakerConfig {
        CircuitBreakerConfig {
            failure_threshold: self.push_failure_threshold,
            open_for: Duration::from_secs(self.push_open_secs),
            success_threshold: self.push_success_threshold,
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
            .with_context(|| format!("{} must be valid, got {:?}", key, raw)),
    }
}
