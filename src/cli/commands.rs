//! Command handlers

use anyhow::{bail, Context, Result};
use credkit_core::{
    CredentialError, CredentialStore, Credentials, SecureString, DEFAULT_CREDENTIALS_KEY,
};
use tracing::debug;
use url::Url;

/// Options of `credkit set`
pub struct SetArgs {
    pub username: Option<String>,
    pub password: Option<String>,
    pub url: Option<Url>,
    pub cloud_sync: bool,
    pub background_access: bool,
}

fn slot_name(key: Option<&str>) -> &str {
    key.unwrap_or("default")
}

pub fn get(store: &CredentialStore, key: Option<&str>, show_password: bool) -> Result<()> {
    let result = match key {
        Some(key) => store.get(key),
        None => store.get_default(),
    };

    let credentials = match result {
        Ok(credentials) => credentials,
        Err(CredentialError::NotFound(_)) => {
            bail!("No credentials stored for {}", slot_name(key))
        }
        Err(e) => return Err(e).context("Failed to read credentials"),
    };

    println!("key:               {}", key.unwrap_or(DEFAULT_CREDENTIALS_KEY));
    println!(
        "username:          {}",
        credentials.username.as_deref().unwrap_or("-")
    );
    if show_password {
        println!("password:          {}", credentials.password.expose());
    } else {
        println!("password:          {}", credentials.password);
    }
    println!(
        "url:               {}",
        credentials.url.as_ref().map_or("-", Url::as_str)
    );
    println!("cloud sync:        {}", credentials.enable_cloud_sync);
    println!("background access: {}", credentials.enable_background_access);
    Ok(())
}

pub fn set(store: &CredentialStore, key: Option<&str>, args: SetArgs) -> Result<()> {
    let password = match args.password {
        Some(password) => SecureString::new(password),
        None => SecureString::new(
            inquire::Password::new("Password:")
                .without_confirmation()
                .prompt()
                .context("Failed to read password")?,
        ),
    };

    let credentials = Credentials {
        username: args.username,
        password,
        url: args.url,
        enable_cloud_sync: args.cloud_sync,
        enable_background_access: args.background_access,
    };

    debug!(slot = slot_name(key), backend = store.backend_name(), "Saving credentials");
    let result = match key {
        Some(key) => store.set(&credentials, key),
        None => store.set_default(&credentials),
    };
    result.context("Failed to store credentials")?;

    println!("Stored credentials for {}", slot_name(key));
    Ok(())
}

pub fn remove(store: &CredentialStore, key: Option<&str>) -> Result<()> {
    let result = match key {
        Some(key) => store.remove(key),
        None => store.remove_default(),
    };
    result.context("Failed to remove credentials")?;

    println!("Removed credentials for {}", slot_name(key));
    Ok(())
}

pub fn remove_all(store: &CredentialStore, yes: bool) -> Result<()> {
    if !yes {
        let confirmed = inquire::Confirm::new("Remove all stored credentials?")
            .with_default(false)
            .prompt()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Aborted");
            return Ok(());
        }
    }

    store
        .remove_all()
        .context("Failed to remove credentials")?;
    println!("Removed all credentials");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(password: &str) -> SetArgs {
        SetArgs {
            username: Some("alice".to_string()),
            password: Some(password.to_string()),
            url: Some(Url::parse("https://example.com/login").unwrap()),
            cloud_sync: false,
            background_access: true,
        }
    }

    #[test]
    fn test_set_then_get_keyed() {
        let store = CredentialStore::in_memory();
        set(&store, Some("svc1"), args("secret1")).unwrap();

        let stored = store.get("svc1").unwrap();
        assert_eq!(stored.password.expose(), "secret1");
        assert!(stored.enable_background_access);
        assert!(get(&store, Some("svc1"), false).is_ok());
    }

    #[test]
    fn test_default_slot_without_key() {
        let store = CredentialStore::in_memory();
        set(&store, None, args("secret1")).unwrap();
        assert!(store.get_default().is_ok());

        remove(&store, None).unwrap();
        let err = get(&store, None, false).unwrap_err();
        assert!(err.to_string().contains("No credentials stored"));
    }

    #[test]
    fn test_remove_all_with_yes() {
        let store = CredentialStore::in_memory();
        set(&store, Some("a"), args("1")).unwrap();
        set(&store, Some("b"), args("2")).unwrap();

        remove_all(&store, true).unwrap();
        assert!(!store.contains("a").unwrap());
        assert!(!store.contains("b").unwrap());
    }
}
