use std::io::{self, Write};

use clap::Args;
use storefront_app::domain::users::{
    PgUsersService, UsersService,
    data::NewUser,
    records::UserUuid,
};
use uuid::Uuid;

use crate::cli::{ServiceArgs, output_error};

#[derive(Debug, Args)]
pub(crate) struct CreateUserArgs {
    #[command(flatten)]
    service: ServiceArgs,

    /// Login name
    #[arg(long)]
    username: String,

    /// Contact email address
    #[arg(long)]
    email: String,

    /// Optional user UUID; generated when omitted
    #[arg(long)]
    user_uuid: Option<Uuid>,
}

pub(crate) async fn run(args: CreateUserArgs) -> Result<(), String> {
    let users = PgUsersService::new(args.service.connect().await?);

    let user = NewUser {
        uuid: args.user_uuid.map_or_else(UserUuid::new, UserUuid::from_uuid),
        username: args.username,
        email: args.email,
    };

    execute(&users, user, &mut io::stdout()).await
}

pub(crate) async fn execute(
    users: &dyn UsersService,
    user: NewUser,
    out: &mut impl Write,
) -> Result<(), String> {
    if user.username.trim().is_empty() {
        return Err("username cannot be empty".to_string());
    }

    let user = users
        .create_user(user)
        .await
        .map_err(|error| format!("failed to create user: {error}"))?;

    writeln!(out, "user_uuid: {}", user.uuid).map_err(output_error)?;
    writeln!(out, "username: {}", user.username).map_err(output_error)?;

    Ok(())
}
