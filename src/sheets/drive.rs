//! Drive-side operations for spreadsheet files
//!
//! Listing, folder-scoped creation and permission grants go through the Drive
//! API rather than the Sheets API.

use crate::config::google::{DRIVE_API_BASE_URL, SPREADSHEET_MIME_TYPE};
use crate::error::{Result, SheetsMcpError};
use crate::sheets::types::{DriveFile, DriveFileCreateRequest, DriveFileList, Permission, PermissionRequest};

/// Drive manager for spreadsheet file operations
pub struct DriveManager<'a> {
    client: &'a reqwest::Client,
    access_token: &'a str,
}

impl<'a> DriveManager<'a> {
    /// Create a new Drive manager
    pub fn new(client: &'a reqwest::Client, access_token: &'a str) -> Self {
        Self {
            client,
            access_token,
        }
    }

    /// Base URL for the files API
    fn files_url() -> String {
        format!("{}/files", DRIVE_API_BASE_URL)
    }

    /// List visible spreadsheets, optionally scoped to a folder,
    /// most recently modified first
    pub async fn list_spreadsheets(&self, folder_id: Option<&str>) -> Result<Vec<DriveFile>> {
        let mut query = format!(
            "mimeType='{}' and trashed=false",
            SPREADSHEET_MIME_TYPE
        );
        if let Some(folder) = folder_id {
            query.push_str(&format!(" and '{}' in parents", folder));
        }

        let response = self
            .client
            .get(Self::files_url())
            .query(&[
                ("q", query.as_str()),
                ("orderBy", "modifiedTime desc"),
                ("fields", "files(id,name)"),
                ("pageSize", "100"),
            ])
            .bearer_auth(self.access_token)
            .send()
            .await?;

        if response.status().is_success() {
            let list: DriveFileList = response.json().await?;
            Ok(list.files)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(SheetsMcpError::from_api_response(
                status,
                &text,
                "spreadsheet listing",
            ))
        }
    }

    /// Create a new spreadsheet file inside a folder
    pub async fn create_spreadsheet(&self, title: &str, folder_id: &str) -> Result<DriveFile> {
        let request = DriveFileCreateRequest {
            name: title.to_string(),
            mime_type: SPREADSHEET_MIME_TYPE.to_string(),
            parents: vec![folder_id.to_string()],
        };

        let url = format!("{}?fields=id,name", Self::files_url());

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.access_token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(SheetsMcpError::from_api_response(
                status,
                &text,
                &format!("folder {}", folder_id),
            ))
        }
    }

    /// Grant a user access to a file. Re-granting an existing user updates
    /// the role (last write wins on the Drive side).
    pub async fn create_permission(
        &self,
        file_id: &str,
        email: &str,
        role: &str,
        send_notification: bool,
    ) -> Result<Permission> {
        let transfer_ownership = role == "owner";
        let url = format!(
            "{}/{}/permissions?sendNotificationEmail={}&transferOwnership={}",
            Self::files_url(),
            file_id,
            send_notification,
            transfer_ownership
        );

        let request = PermissionRequest {
            grantee_type: "user".to_string(),
            role: role.to_string(),
            email_address: email.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.access_token)
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            Err(SheetsMcpError::from_api_response(
                status,
                &text,
                &format!("spreadsheet {}", file_id),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_files_url() {
        assert_eq!(
            DriveManager::files_url(),
            "https://www.googleapis.com/drive/v3/files"
        );
    }
}
