//! Typed `pvesh` accessors over the SSH transport.
//!
//! One method per endpoint the commands need. Fetches return flat records;
//! mutations return nothing (except token creation, whose secret only
//! exists in the creation response).

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::acl::record::proxmox_bool;
use crate::acl::{AclApi, AclRecord, DesiredGrant};
use crate::ssh::SshTarget;

pub struct PveClient {
    target: SshTarget,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupInfo {
    pub groupid: String,
    #[serde(default)]
    pub comment: Option<String>,
}

/// Detail view of one group, including membership.
#[derive(Debug, Clone, Deserialize)]
pub struct GroupDetail {
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub userid: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub tokenid: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub expire: Option<i64>,
}

/// Creation response for a token. The value is shown once and cannot be
/// retrieved again.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSecret {
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageInfo {
    pub storage: String,
    #[serde(rename = "type")]
    pub storage_type: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, with = "proxmox_bool")]
    pub shared: bool,
}

/// Extra fields for user creation; all optional.
#[derive(Debug, Default, Clone)]
pub struct NewUser<'a> {
    pub comment: Option<&'a str>,
    pub email: Option<&'a str>,
    pub groups: Option<&'a str>,
    pub firstname: Option<&'a str>,
    pub lastname: Option<&'a str>,
}

impl PveClient {
    pub fn new(target: SshTarget) -> Self {
        Self { target }
    }

    fn get_list<T: DeserializeOwned>(&self, endpoint: &str, extra: &[&str]) -> Result<Vec<T>> {
        let mut args = vec!["get".to_string(), endpoint.to_string()];
        args.extend(extra.iter().map(|s| (*s).to_string()));
        args.extend(output_json());

        let raw = self.target.pvesh(&args)?;
        // an empty table comes back as nothing at all or as JSON null
        if raw.is_empty() || raw == "null" {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).with_context(|| format!("unexpected response from {endpoint}"))
    }

    fn get_one<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T> {
        let mut args = vec!["get".to_string(), endpoint.to_string()];
        args.extend(output_json());
        let raw = self.target.pvesh(&args)?;
        serde_json::from_str(&raw).with_context(|| format!("unexpected response from {endpoint}"))
    }

    // ------------------------------------------------------------------
    // ACLs
    // ------------------------------------------------------------------

    pub fn fetch_acls(&self) -> Result<Vec<AclRecord>> {
        self.get_list("/access/acl", &[])
    }

    // ------------------------------------------------------------------
    // Groups
    // ------------------------------------------------------------------

    pub fn fetch_groups(&self) -> Result<Vec<GroupInfo>> {
        self.get_list("/access/groups", &[])
    }

    pub fn get_group(&self, groupid: &str) -> Result<GroupDetail> {
        self.get_one(&format!("/access/groups/{groupid}"))
    }

    pub fn group_exists(&self, groupid: &str) -> Result<bool> {
        Ok(self.fetch_groups()?.iter().any(|g| g.groupid == groupid))
    }

    pub fn create_group(&self, groupid: &str, comment: Option<&str>) -> Result<()> {
        let mut args = string_args(&["create", "/access/groups", "--groupid", groupid]);
        push_opt(&mut args, "--comment", comment);
        self.target.pvesh(&args)?;
        Ok(())
    }

    pub fn delete_group(&self, groupid: &str) -> Result<()> {
        self.target
            .pvesh(&string_args(&["delete", &format!("/access/groups/{groupid}")]))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub fn fetch_users(&self) -> Result<Vec<UserInfo>> {
        self.get_list("/access/users", &[])
    }

    pub fn user_exists(&self, userid: &str) -> Result<bool> {
        Ok(self.fetch_users()?.iter().any(|u| u.userid == userid))
    }

    pub fn create_user(&self, userid: &str, new: &NewUser) -> Result<()> {
        let mut args = string_args(&["create", "/access/users", "--userid", userid]);
        push_opt(&mut args, "--comment", new.comment);
        push_opt(&mut args, "--email", new.email);
        push_opt(&mut args, "--groups", new.groups);
        push_opt(&mut args, "--firstname", new.firstname);
        push_opt(&mut args, "--lastname", new.lastname);
        self.target.pvesh(&args)?;
        Ok(())
    }

    pub fn delete_user(&self, userid: &str) -> Result<()> {
        self.target
            .pvesh(&string_args(&["delete", &format!("/access/users/{userid}")]))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // User API tokens
    // ------------------------------------------------------------------

    pub fn fetch_user_tokens(&self, userid: &str) -> Result<Vec<TokenInfo>> {
        self.get_list(&format!("/access/users/{userid}/token"), &[])
    }

    pub fn token_exists(&self, userid: &str, tokenid: &str) -> Result<bool> {
        if !self.user_exists(userid)? {
            return Ok(false);
        }
        Ok(self
            .fetch_user_tokens(userid)?
            .iter()
            .any(|t| t.tokenid == tokenid))
    }

    pub fn create_token(
        &self,
        userid: &str,
        tokenid: &str,
        comment: Option<&str>,
        privsep: bool,
        expire: i64,
    ) -> Result<TokenSecret> {
        let mut args = string_args(&[
            "create",
            &format!("/access/users/{userid}/token/{tokenid}"),
            "--privsep",
            flag(privsep),
            "--expire",
            &expire.to_string(),
        ]);
        push_opt(&mut args, "--comment", comment);
        args.extend(output_json());

        let raw = self.target.pvesh(&args)?;
        serde_json::from_str(&raw)
            .with_context(|| format!("unexpected token creation response for {userid}!{tokenid}"))
    }

    pub fn delete_token(&self, userid: &str, tokenid: &str) -> Result<()> {
        self.target.pvesh(&string_args(&[
            "delete",
            &format!("/access/users/{userid}/token/{tokenid}"),
        ]))?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Directory storage
    // ------------------------------------------------------------------

    pub fn fetch_dir_storages(&self) -> Result<Vec<StorageInfo>> {
        self.get_list("/storage", &["--type", "dir"])
    }

    pub fn get_storage(&self, storageid: &str) -> Result<StorageInfo> {
        self.get_one(&format!("/storage/{storageid}"))
    }

    pub fn storage_exists(&self, storageid: &str) -> Result<bool> {
        Ok(self
            .fetch_dir_storages()?
            .iter()
            .any(|s| s.storage == storageid))
    }

    pub fn create_storage(
        &self,
        storageid: &str,
        path: &str,
        content: &str,
        shared: bool,
    ) -> Result<()> {
        self.target.pvesh(&string_args(&[
            "create",
            "/storage",
            "--storage",
            storageid,
            "--type",
            "dir",
            "--path",
            path,
            "--content",
            content,
            "--shared",
            flag(shared),
        ]))?;
        Ok(())
    }

    pub fn set_storage_content(&self, storageid: &str, content: &str) -> Result<()> {
        self.target.pvesh(&string_args(&[
            "set",
            &format!("/storage/{storageid}"),
            "--content",
            content,
        ]))?;
        Ok(())
    }

    pub fn set_storage_shared(&self, storageid: &str, shared: bool) -> Result<()> {
        self.target.pvesh(&string_args(&[
            "set",
            &format!("/storage/{storageid}"),
            "--shared",
            flag(shared),
        ]))?;
        Ok(())
    }

    pub fn delete_storage(&self, storageid: &str) -> Result<()> {
        self.target
            .pvesh(&string_args(&["delete", &format!("/storage/{storageid}")]))?;
        Ok(())
    }
}

impl AclApi for PveClient {
    fn fetch_acls(&self) -> Result<Vec<AclRecord>> {
        PveClient::fetch_acls(self)
    }

    fn apply_acl(&self, grant: &DesiredGrant, delete: bool) -> Result<()> {
        self.target.pvesh(&acl_set_args(grant, delete))?;
        Ok(())
    }
}

/// `pvesh set /access/acl` argument list for one bulk merge or delete.
///
/// The delete form omits `--propagate`: removal matches grants with either
/// value, and the remote side resolves principal + delete flag on its own.
fn acl_set_args(grant: &DesiredGrant, delete: bool) -> Vec<String> {
    let mut args = string_args(&[
        "set",
        "/access/acl",
        "--path",
        &grant.path,
        "--roles",
        &grant.roleid,
    ]);

    if !grant.groups.is_empty() {
        args.push("--groups".to_string());
        args.push(grant.groups.join(","));
    }
    if !grant.tokens.is_empty() {
        args.push("--tokens".to_string());
        args.push(grant.tokens.join(","));
    }
    if !grant.users.is_empty() {
        args.push("--users".to_string());
        args.push(grant.users.join(","));
    }

    if delete {
        args.push("--delete".to_string());
        args.push("1".to_string());
    } else {
        args.push("--propagate".to_string());
        args.push(flag(grant.propagate).to_string());
    }

    args
}

fn output_json() -> [String; 2] {
    ["--output-format".to_string(), "json".to_string()]
}

fn string_args(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_string()).collect()
}

fn push_opt(args: &mut Vec<String>, name: &str, value: Option<&str>) {
    if let Some(value) = value {
        args.push(name.to_string());
        args.push(value.to_string());
    }
}

fn flag(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}
