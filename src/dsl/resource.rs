use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};

pub const BATCH_SUBMIT_JOB_ARN: &str = "arn:aws:states:::batch:submitJob.sync";
pub const ECS_RUN_TASK_ARN: &str = "arn:aws:states:::ecs:runTask.sync";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Lambda,
    Activity,
    Batch,
    Ecs,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceType::Lambda => write!(f, "lambda"),
            ResourceType::Activity => write!(f, "activity"),
            ResourceType::Batch => write!(f, "batch"),
            ResourceType::Ecs => write!(f, "ecs"),
        }
    }
}

/// What a Task invokes. Serialized as a single ARN string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Resource {
    name: String,
    resource_type: ResourceType,
    region: String,
    account: String,
}

impl Resource {
    /// Lambda and activity resources are addressed by name, so the name must not be empty.
    pub fn new(name: impl Into<String>, resource_type: ResourceType) -> Result<Self> {
        let name = name.into();
        if name.is_empty() && matches!(resource_type, ResourceType::Lambda | ResourceType::Activity) {
            return Err(GraphError::InvalidArgument(format!(
                "a {} resource needs a name",
                resource_type
            )));
        }
        Ok(Self {
            name,
            resource_type,
            region: String::new(),
            account: String::new(),
        })
    }

    pub fn lambda(name: impl Into<String>) -> Result<Self> {
        Self::new(name, ResourceType::Lambda)
    }

    pub fn activity(name: impl Into<String>) -> Result<Self> {
        Self::new(name, ResourceType::Activity)
    }

    pub fn batch() -> Self {
        Self {
            name: String::new(),
            resource_type: ResourceType::Batch,
            region: String::new(),
            account: String::new(),
        }
    }

    pub fn ecs() -> Self {
        Self {
            resource_type: ResourceType::Ecs,
            ..Self::batch()
        }
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    pub fn account(mut self, account: impl Into<String>) -> Self {
        self.account = account.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    pub fn arn(&self) -> String {
        match self.resource_type {
            ResourceType::Lambda => format!(
                "arn:aws:lambda:{}:{}:function:{}",
                self.region, self.account, self.name
            ),
            ResourceType::Activity => format!(
                "arn:aws:states:{}:{}:activity:{}",
                self.region, self.account, self.name
            ),
            ResourceType::Batch => BATCH_SUBMIT_JOB_ARN.to_string(),
            ResourceType::Ecs => ECS_RUN_TASK_ARN.to_string(),
        }
    }

    /// Parses one of the four ARN shapes produced by [`Resource::arn`].
    pub fn from_arn(arn: &str) -> Result<Self> {
        if arn == BATCH_SUBMIT_JOB_ARN {
            return Ok(Self::batch());
        }
        if arn == ECS_RUN_TASK_ARN {
            return Ok(Self::ecs());
        }

        let invalid = || GraphError::InvalidArgument(format!("unrecognised resource ARN '{}'", arn));

        // arn:aws:<service>:<region>:<account>:<kind>:<name...>
        let parts: Vec<&str> = arn.splitn(7, ':').collect();
        if parts.len() != 7 || parts[0] != "arn" || parts[1] != "aws" {
            return Err(invalid());
        }
        let resource_type = match (parts[2], parts[5]) {
            ("lambda", "function") => ResourceType::Lambda,
            ("states", "activity") => ResourceType::Activity,
            _ => return Err(invalid()),
        };

        Ok(Self::new(parts[6], resource_type)?
            .region(parts[3])
            .account(parts[4]))
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.arn())
    }
}
