// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Workspace CRUD operations.

use rusqlite::{OptionalExtension, Row, params};

use vidcast_core::{VidcastError, Workspace};

use crate::database::{Database, map_tr_err, parse_json, parse_ts, ts};

const COLUMNS: &str = "id, tenant_id, user_id, name, credentials, created_at, updated_at";

fn row_to_workspace(row: &Row<'_>) -> rusqlite::Result<Workspace> {
    let credentials: String = row.get(4)?;
    let created_at: String = row.get(5)?;
    let updated_at: String = row.get(6)?;
    Ok(Workspace {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        user_id: row.get(2)?,
        name: row.get(3)?,
        credentials: parse_json(4, &credentials)?,
        created_at: parse_ts(5, &created_at)?,
        updated_at: parse_ts(6, &updated_at)?,
    })
}

/// Insert a new workspace.
pub async fn create_workspace(db: &Database, workspace: &Workspace) -> Result<(), VidcastError> {
    let ws = workspace.clone();
    let credentials = serde_json::to_string(&ws.credentials)?;
    db.connection()
        .call(move |conn| {
            conn.execute(
                &format!("INSERT INTO workspaces ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
                params![
                    ws.id,
                    ws.tenant_id,
                    ws.user_id,
                    ws.name,
                    credentials,
                    ts(&ws.created_at),
                    ts(&ws.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Get a workspace by tenant and id.
pub async fn get_workspace(
    db: &Database,
    tenant_id: &str,
    id: &str,
) -> Result<Option<Workspace>, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                &format!("SELECT {COLUMNS} FROM workspaces WHERE tenant_id = ?1 AND id = ?2"),
                params![tenant_id, id],
                row_to_workspace,
            )
            .optional()
        })
        .await
        .map_err(map_tr_err)
}

/// Workspaces owned by a user, oldest first.
pub async fn list_workspaces(
    db: &Database,
    tenant_id: &str,
    user_id: &str,
) -> Result<Vec<Workspace>, VidcastError> {
    let tenant_id = tenant_id.to_string();
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM workspaces
                 WHERE tenant_id = ?1 AND user_id = ?2
                 ORDER BY created_at ASC, id ASC"
            ))?;
            let rows = stmt.query_map(params![tenant_id, user_id], row_to_workspace)?;
            rows.collect::<Result<Vec<_>, _>>()
        })
        .await
        .map_err(map_tr_err)
}

/// Overwrite name and credentials.
pub async fn update_workspace(db: &Database, workspace: &Workspace) -> Result<(), VidcastError> {
    let ws = workspace.clone();
    let id = ws.id.clone();
    let credentials = serde_json::to_string(&ws.credentials)?;
    let changed = db
        .connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE workspaces SET name = ?3, credentials = ?4, updated_at = ?5
                 WHERE tenant_id = ?1 AND id = ?2",
                params![ws.tenant_id, ws.id, ws.name, credentials, ts(&ws.updated_at)],
            )
        })
        .await
        .map_err(map_tr_err)?;
    if changed == 0 {
        return Err(VidcastError::NotFound {
            entity: "workspace",
            id,
        });
    }
    Ok(())
}
