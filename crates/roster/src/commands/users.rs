//! User command handlers.

use std::path::Path;
use std::sync::Arc;

use tabled::Tabled;

use roster_core::{User, UserFormData};

use crate::cli::{GlobalOpts, UserFields, UsersArgs, UsersCommand};
use crate::error::CliError;
use crate::output;

use super::CliContext;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: u64,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "City")]
    city: String,
    #[tabled(rename = "Company")]
    company: String,
}

impl From<&Arc<User>> for UserRow {
    fn from(u: &Arc<User>) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            username: u.username.clone(),
            email: u.email.clone(),
            city: u.address.city.clone(),
            company: u.company.name.clone(),
        }
    }
}

fn detail(u: &Arc<User>) -> String {
    let address = &u.address;
    let mut street = address.street.clone();
    if !address.suite.is_empty() {
        street = format!("{street}, {}", address.suite);
    }

    let mut pairs = vec![
        ("ID", u.id.to_string()),
        ("Name", u.name.clone()),
        ("Username", u.username.clone()),
        ("Email", u.email.clone()),
        ("Phone", u.phone.clone()),
        ("Website", u.website.clone()),
        ("Address", street),
        ("City", format!("{} {}", address.zipcode, address.city).trim().to_owned()),
    ];
    if let Some(ref geo) = address.geo {
        pairs.push(("Geo", format!("{}, {}", geo.lat, geo.lng)));
    }
    pairs.push(("Company", u.company.name.clone()));
    if let Some(ref phrase) = u.company.catch_phrase {
        pairs.push(("Catch phrase", phrase.clone()));
    }
    output::detail(&pairs)
}

// ── Payload helpers ─────────────────────────────────────────────────

impl UserFields {
    /// Overlay the fields given on the command line onto `draft`.
    fn apply(self, mut draft: UserFormData) -> UserFormData {
        let overlay = |target: &mut String, value: Option<String>| {
            if let Some(value) = value {
                *target = value;
            }
        };
        overlay(&mut draft.name, self.name);
        overlay(&mut draft.username, self.username);
        overlay(&mut draft.email, self.email);
        overlay(&mut draft.phone, self.phone);
        overlay(&mut draft.website, self.website);
        overlay(&mut draft.address.street, self.street);
        overlay(&mut draft.address.suite, self.suite);
        overlay(&mut draft.address.city, self.city);
        overlay(&mut draft.address.zipcode, self.zipcode);
        overlay(&mut draft.company.name, self.company);
        draft
    }
}

/// Read a `UserFormData` JSON payload for `--from-file`.
fn read_draft(path: &Path) -> Result<UserFormData, CliError> {
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn validate(draft: &UserFormData) -> Result<(), CliError> {
    draft.validate().map_err(|errors| CliError::Validation {
        field: "user".into(),
        reason: errors.to_string(),
    })
}

fn not_found(id: u64) -> CliError {
    CliError::NotFound {
        resource_type: "user".into(),
        identifier: id.to_string(),
        list_command: "users list".into(),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(ctx: &CliContext, args: UsersArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let users = ctx.users();
    let format = global.output_format();

    match args.command {
        UsersCommand::List => {
            let snap = users.list().await?;
            let out = output::render_list(
                format,
                snap.as_slice(),
                |u| UserRow::from(u),
                |u| u.id.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Get { id } => {
            users.list().await?;
            let user = users.by_id(id).ok_or_else(|| not_found(id))?;
            let out = output::render_single(format, &user, detail, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Create { fields, from_file } => {
            let draft = match from_file {
                Some(path) => read_draft(&path)?,
                None => fields.apply(UserFormData::default()),
            };
            validate(&draft)?;

            let created = users.create(&draft).await?;
            let out = output::render_single(format, &created, detail, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Update {
            id,
            fields,
            from_file,
        } => {
            let draft = match from_file {
                Some(path) => read_draft(&path)?,
                None => {
                    users.list().await?;
                    let current = users.by_id(id).ok_or_else(|| not_found(id))?;
                    fields.apply(UserFormData::from(current.as_ref()))
                }
            };
            validate(&draft)?;

            let updated = users.update(id, &draft).await?;
            let out = output::render_single(format, &updated, detail, |u| u.id.to_string())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        UsersCommand::Delete { id } => {
            users.delete(id).await?;
            if !global.quiet {
                eprintln!("User {id} deleted");
            }
            Ok(())
        }
    }
}
