//! `storefront settings show|set`.

use anyhow::Result;
use clap::Subcommand;

use storefront_core::BusinessProfile;
use storefront_db::SettingsStore;

use super::Context;

#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Print the business profile
    Show,
    /// Update fields of the business profile; omitted fields are kept
    Set {
        #[arg(long)]
        business_name: Option<String>,
        #[arg(long)]
        owner_name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        upi_id: Option<String>,
    },
}

pub async fn run(ctx: &Context, command: SettingsCommand) -> Result<()> {
    let profile = match command {
        SettingsCommand::Show => ctx.db.load_settings(&ctx.session).await?,
        SettingsCommand::Set {
            business_name,
            owner_name,
            phone,
            email,
            upi_id,
        } => {
            let update = BusinessProfile {
                business_name,
                owner_name,
                phone,
                email,
                upi_id,
            };
            ctx.db.save_settings(&ctx.session, update).await?
        }
    };

    if ctx.json {
        return ctx.print_json(&profile);
    }

    let show = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".to_string());
    println!("Business: {}", show(&profile.business_name));
    println!("Owner:    {}", show(&profile.owner_name));
    println!("Phone:    {}", show(&profile.phone));
    println!("Email:    {}", show(&profile.email));
    println!("UPI ID:   {}", show(&profile.upi_id));
    Ok(())
}
