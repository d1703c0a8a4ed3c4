// SPDX-FileCopyrightText: 2026 Vidcast Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vidcast jobs` subcommands.

use vidcast_core::{NewPublicationJob, VidcastError};
use vidcast_publish::JobService;

use crate::{JobsCommand, print_json};

pub async fn run_jobs(service: &JobService, command: JobsCommand) -> Result<(), VidcastError> {
    match command {
        JobsCommand::List {
            tenant,
            status,
            platform,
            limit,
            offset,
        } => {
            let jobs = match (status, platform) {
                (Some(_), Some(_)) => {
                    return Err(VidcastError::Validation(
                        "--status and --platform cannot be combined".into(),
                    ));
                }
                (Some(status), None) => service.jobs_by_status(&tenant, status, limit, offset).await?,
                (None, Some(platform)) => {
                    service.jobs_by_platform(&tenant, platform, limit, offset).await?
                }
                (None, None) => service.list_jobs(&tenant, limit, offset).await?,
            };
            print_json(&jobs)
        }
        JobsCommand::Show { tenant, id } => print_json(&service.get_job(&tenant, &id).await?),
        JobsCommand::Cancel { tenant, id } => print_json(&service.cancel_job(&tenant, &id).await?),
        JobsCommand::Create {
            tenant,
            user,
            video,
            platform,
            workspace,
            scheduled_at,
            max_retries,
        } => {
            let mut request = NewPublicationJob::new(video, platform);
            if let Some(workspace) = workspace {
                request = request.config(serde_json::json!({ "workspace_id": workspace }));
            }
            request.scheduled_at = scheduled_at;
            request.max_retries = max_retries;
            print_json(&service.create_job(&tenant, &user, request).await?)
        }
    }
}
