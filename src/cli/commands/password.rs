use anyhow::Context;

use crate::auth::password::hash_password;

pub fn handle(password: &str, cost: u32) -> anyhow::Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let hashed = hash_password(password, cost).context("failed to hash password")?;
    println!("{}", hashed);
    Ok(())
}
