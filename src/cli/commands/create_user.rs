//! create_user command implementation
//!
//! Finds or creates a target-store user for a source-system account and
//! optionally makes them owner of existing communities.

use super::{connect_or_report, load_or_report, report};
use crate::core::provisioning::{Provisioner, UserRequest};
use clap::Args;

/// Arguments for the create_user command
#[derive(Args, Debug, Default)]
pub struct CreateUserArgs {
    /// Email address of the user
    #[arg(long)]
    pub email: String,

    /// Username in the source system
    #[arg(long)]
    pub source_username: String,

    /// Identity provider of the username (default from configuration)
    #[arg(long)]
    pub origin: Option<String>,

    /// Display name
    #[arg(long)]
    pub full_name: Option<String>,

    /// Community (slug or id) to make the user owner of; repeatable
    #[arg(long = "community-owner", value_name = "COMMUNITY")]
    pub community_owner: Vec<String>,
}

impl CreateUserArgs {
    /// Builds the provisioning request
    pub fn request(&self, default_origin: &str) -> Result<UserRequest, String> {
        let email = self.email.trim();
        if !email.contains('@') {
            return Err(format!("'{email}' is not an email address"));
        }
        let username = self.source_username.trim();
        if username.is_empty() {
            return Err("--source-username cannot be empty".to_string());
        }

        Ok(UserRequest {
            origin: self
                .origin
                .as_deref()
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .unwrap_or(default_origin)
                .to_string(),
            source_username: Some(username.to_string()),
            email: Some(email.to_string()),
            full_name: self.full_name.clone(),
        })
    }

    /// Execute the create_user command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        let config = match load_or_report(config_path) {
            Ok(c) => c,
            Err(code) => return Ok(code),
        };

        let request = match self.request(&config.provisioning.default_origin) {
            Ok(r) => r,
            Err(message) => {
                eprintln!("❌ {message}");
                return Ok(2);
            }
        };

        let services = match connect_or_report(&config) {
            Ok(s) => s,
            Err(code) => return Ok(code),
        };
        let provisioner = Provisioner::new(&services, config.provisioning.clone());

        let outcome = match provisioner.create_user(&request, &self.community_owner).await {
            Ok(o) => o,
            Err(e) => {
                report("Failed to create user", &e);
                return Ok(1);
            }
        };

        let user = outcome.resolution.user();
        if outcome.resolution.already_existed() {
            println!("ℹ️  User already existed: {} ({})", user.email, user.id);
        } else {
            println!("✅ User created: {} ({})", user.email, user.id);
        }
        println!(
            "   Identity: {}:{}",
            request.origin,
            request.source_username.as_deref().unwrap_or_default()
        );

        for assignment in &outcome.assignments {
            match &assignment.error {
                None => println!("✅ Owner of community {}", assignment.reference),
                Some(error) => println!("❌ Community {}: {error}", assignment.reference),
            }
        }

        Ok(if outcome.all_assigned() { 0 } else { 1 })
    }
}
