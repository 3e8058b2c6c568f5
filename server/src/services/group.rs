use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use super::Principal;
use crate::models::{
    CreateGroupRequest, CreateMembershipRequest, EventFilter, Group, GroupDetails, UserGroup,
};
use crate::store::Store;
use crate::utils::validation::{ValidationErrors, MUST_EXIST};
use crate::utils::{AppError, AppResult};

/// Groups and group membership.
pub struct GroupService {
    store: Arc<dyn Store>,
}

impl GroupService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn create(&self, request: CreateGroupRequest) -> AppResult<Group> {
        let group = self.store.insert_group(request.validate()?).await?;
        info!(group_id = %group.id, name = %group.name, "Group created");
        Ok(group)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<GroupDetails> {
        let group = self
            .store
            .get_group(id)
            .await?
            .ok_or_else(|| AppError::not_found("Group", id))?;
        let events = self.store.list_events(&EventFilter::for_group(id)).await?;
        Ok(GroupDetails { group, events })
    }

    pub async fn list(&self) -> AppResult<Vec<Group>> {
        Ok(self.store.list_groups().await?)
    }

    pub async fn join(
        &self,
        principal: &Principal,
        request: CreateMembershipRequest,
    ) -> AppResult<UserGroup> {
        let Some(group_id) = request.group_id else {
            return Err(ValidationErrors::single("group", MUST_EXIST).into());
        };
        if self.store.get_group(group_id).await?.is_none() {
            return Err(AppError::not_found("Group", group_id));
        }

        let membership = self
            .store
            .insert_membership(principal.user_id, group_id)
            .await?;
        info!(user_id = %principal.user_id, group_id = %group_id, "Joined group");
        Ok(membership)
    }

    pub async fn leave(&self, principal: &Principal, membership_id: Uuid) -> AppResult<()> {
        match self.store.get_membership(membership_id).await? {
            Some(m) if m.user_id == principal.user_id => {}
            _ => return Err(AppError::not_found("Membership", membership_id)),
        }

        if !self.store.delete_membership(membership_id).await? {
            return Err(AppError::not_found("Membership", membership_id));
        }
        info!(membership_id = %membership_id, "Left group");
        Ok(())
    }
}
