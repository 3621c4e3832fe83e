//! Portal services: every view's data access goes through here.
//!
//! Reads are best-effort: a failed query is logged and yields an empty result
//! set. Writes surface their error to the caller as a [`ServiceError`].

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use uuid::Uuid;

use egov_auth::{AccessGate, IdentityProvider, MetadataPatch, Role};
use egov_core::{CertificateId, GrievanceId, PropertyTaxId};
use egov_portal::{
    AdminDashboard, Announcement, Certificate, CertificateApplication, CitizenDashboard,
    Grievance, GrievanceUpdate, NewAnnouncement, NewGrievance, NewPropertyTax, Profile,
    ProfileUpdate, ProfileView, PropertyTax, Review, RoleRecord, TaxCollectionStats, TaxSummary,
    UserDirectoryEntry,
};
use egov_store::{
    Caller, DataStore, Query, Registration, Row, StoreError, StoreRoleLookup, Table, maybe_single,
    register_principal,
};

use crate::app::errors::ServiceError;
use crate::context::ViewContext;

pub type SharedStore = Arc<dyn DataStore>;
pub type SharedIdentity = Arc<dyn IdentityProvider>;
pub type PortalGate = AccessGate<SharedIdentity, StoreRoleLookup<SharedStore>>;

pub struct PortalServices {
    store: SharedStore,
    identity: SharedIdentity,
}

fn to_row<T: Serialize>(value: &T) -> Result<Row, ServiceError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRow(format!("expected an object, got {other}")).into()),
    }
}

fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, ServiceError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

impl PortalServices {
    pub fn new(store: SharedStore, identity: SharedIdentity) -> Self {
        Self { store, identity }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    pub fn identity(&self) -> &SharedIdentity {
        &self.identity
    }

    /// Gate wired to this service's identity provider and role table.
    pub fn gate(&self) -> PortalGate {
        AccessGate::new(
            self.identity.clone(),
            StoreRoleLookup::new(self.store.clone()),
        )
    }

    // -------------------------
    // Store helpers
    // -------------------------

    async fn read<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: Table,
        query: Query,
    ) -> Vec<T> {
        let rows = match self.store.select(caller, table, query).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::warn!(table = %table, error = %e, "read failed; rendering empty result");
                return Vec::new();
            }
        };

        rows.into_iter()
            .filter_map(|row| match from_row(row) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!(table = %table, error = %e, "skipping malformed row");
                    None
                }
            })
            .collect()
    }

    /// Load one visible record for a write path. Invisible or missing is `NotFound`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: Table,
        id: Uuid,
    ) -> Result<T, ServiceError> {
        let rows = self
            .store
            .select(caller, table, Query::new().eq("id", id.to_string()))
            .await?;
        match maybe_single(table, rows)? {
            Some(row) => from_row(row),
            None => Err(StoreError::NotFound {
                table: table.name(),
                id,
            }
            .into()),
        }
    }

    async fn insert<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: Table,
        row: Row,
    ) -> Result<T, ServiceError> {
        from_row(self.store.insert(caller, table, row).await?)
    }

    async fn update<T: DeserializeOwned>(
        &self,
        caller: &Caller,
        table: Table,
        id: Uuid,
        patch: Row,
    ) -> Result<T, ServiceError> {
        from_row(self.store.update(caller, table, id, patch).await?)
    }

    fn own(ctx: &ViewContext) -> Query {
        Query::new().eq("user_id", ctx.principal_id().to_string())
    }

    // -------------------------
    // Citizen views
    // -------------------------

    pub async fn citizen_dashboard(&self, ctx: &ViewContext) -> CitizenDashboard {
        let caller = ctx.caller();
        let certificates: Vec<Certificate> =
            self.read(&caller, Table::Certificates, Self::own(ctx)).await;
        let grievances: Vec<Grievance> =
            self.read(&caller, Table::Grievances, Self::own(ctx)).await;
        let taxes: Vec<PropertyTax> = self
            .read(&caller, Table::PropertyTax, Self::own(ctx).eq("status", "unpaid"))
            .await;
        let announcements: Vec<Announcement> =
            self.read(&caller, Table::Announcements, Query::new()).await;

        CitizenDashboard::compute(&certificates, &grievances, &taxes, announcements.len())
    }

    pub async fn list_certificates(&self, ctx: &ViewContext) -> Vec<Certificate> {
        self.read(
            &ctx.caller(),
            Table::Certificates,
            Self::own(ctx).order_by("created_at", false),
        )
        .await
    }

    /// Submit an application. Identical submissions create distinct records.
    pub async fn apply_certificate(
        &self,
        ctx: &ViewContext,
        form: CertificateApplication,
    ) -> Result<Certificate, ServiceError> {
        form.validate()?;
        let mut row = to_row(&form)?;
        row.insert("user_id".to_string(), json!(ctx.principal_id()));

        let certificate: Certificate = self.insert(&ctx.caller(), Table::Certificates, row).await?;
        tracing::info!(
            certificate_id = %certificate.id,
            certificate_type = ?certificate.certificate_type,
            "certificate application submitted"
        );
        Ok(certificate)
    }

    pub async fn list_property_tax(&self, ctx: &ViewContext) -> (Vec<PropertyTax>, TaxSummary) {
        let records: Vec<PropertyTax> = self
            .read(
                &ctx.caller(),
                Table::PropertyTax,
                Self::own(ctx).order_by("created_at", false),
            )
            .await;
        let summary = TaxSummary::from_records(&records);
        (records, summary)
    }

    pub async fn pay_property_tax(
        &self,
        ctx: &ViewContext,
        id: PropertyTaxId,
    ) -> Result<PropertyTax, ServiceError> {
        let caller = ctx.caller();
        let record: PropertyTax = self.fetch(&caller, Table::PropertyTax, *id.as_uuid()).await?;
        let payment = record.pay(Utc::now())?;

        let paid: PropertyTax = self
            .update(&caller, Table::PropertyTax, *id.as_uuid(), to_row(&payment)?)
            .await?;
        tracing::info!(property_tax_id = %paid.id, amount = %paid.tax_amount, "property tax paid");
        Ok(paid)
    }

    pub async fn list_grievances(&self, ctx: &ViewContext) -> Vec<Grievance> {
        self.read(
            &ctx.caller(),
            Table::Grievances,
            Self::own(ctx).order_by("created_at", false),
        )
        .await
    }

    pub async fn submit_grievance(
        &self,
        ctx: &ViewContext,
        form: NewGrievance,
    ) -> Result<Grievance, ServiceError> {
        form.validate()?;
        let mut row = to_row(&form)?;
        row.insert("user_id".to_string(), json!(ctx.principal_id()));

        let grievance: Grievance = self.insert(&ctx.caller(), Table::Grievances, row).await?;
        tracing::info!(
            grievance_id = %grievance.id,
            priority = ?grievance.priority,
            "grievance submitted"
        );
        Ok(grievance)
    }

    pub async fn list_announcements(&self, ctx: &ViewContext) -> Vec<Announcement> {
        self.read(
            &ctx.caller(),
            Table::Announcements,
            Query::new().order_by("published_date", false),
        )
        .await
    }

    async fn role_of(&self, ctx: &ViewContext) -> Option<Role> {
        let rows: Vec<RoleRecord> =
            self.read(&ctx.caller(), Table::UserRoles, Self::own(ctx)).await;
        match rows.as_slice() {
            [] => None,
            [only] => Some(only.role),
            _ => {
                tracing::warn!(
                    principal_id = %ctx.principal_id(),
                    "multiple role rows; reporting default role"
                );
                None
            }
        }
    }

    pub async fn profile(&self, ctx: &ViewContext) -> ProfileView {
        let profiles: Vec<Profile> = self
            .read(
                &ctx.caller(),
                Table::Profiles,
                Query::new().eq("id", ctx.principal_id().to_string()),
            )
            .await;
        let role = self.role_of(ctx).await;
        ProfileView::new(ctx.principal(), profiles.first(), role)
    }

    /// Patch metadata at the identity provider, then mirror it into `profiles`.
    ///
    /// The provider holds the source of truth; a failed mirror is logged only.
    pub async fn update_profile(
        &self,
        ctx: &ViewContext,
        patch: MetadataPatch,
    ) -> Result<ProfileView, ServiceError> {
        let update = ProfileUpdate::from(&patch);
        let principal = self.identity.update_user(ctx.principal(), patch).await?;

        if !update.is_empty() {
            let mirrored = self
                .mirror_profile(ctx, principal.email.as_deref(), &update)
                .await;
            if let Err(e) = mirrored {
                tracing::warn!(
                    principal_id = %ctx.principal_id(),
                    error = %e,
                    "profile mirror failed; identity metadata already updated"
                );
            }
        }

        let refreshed = ViewContext::new(principal, ctx.variant());
        Ok(self.profile(&refreshed).await)
    }

    async fn mirror_profile(
        &self,
        ctx: &ViewContext,
        email: Option<&str>,
        update: &ProfileUpdate,
    ) -> Result<(), ServiceError> {
        let caller = ctx.caller();
        let id = ctx.principal_id();
        let existing = self
            .store
            .select(&caller, Table::Profiles, Query::new().eq("id", id.to_string()))
            .await?;

        if existing.is_empty() {
            let mut row = to_row(update)?;
            row.insert("id".to_string(), json!(id));
            row.insert("email".to_string(), json!(email));
            self.store.insert(&caller, Table::Profiles, row).await?;
        } else {
            self.store
                .update(&caller, Table::Profiles, *id.as_uuid(), to_row(update)?)
                .await?;
        }
        Ok(())
    }

    pub async fn register(&self, ctx: &ViewContext) -> Result<Registration, ServiceError> {
        Ok(register_principal(&*self.store, ctx.principal()).await?)
    }

    // -------------------------
    // Admin views (scope enforced by store policy)
    // -------------------------

    pub async fn admin_dashboard(&self, ctx: &ViewContext) -> AdminDashboard {
        let caller = ctx.caller();
        let roles: Vec<RoleRecord> = self
            .read(&caller, Table::UserRoles, Query::new().eq("role", "citizen"))
            .await;
        let certificates: Vec<Certificate> =
            self.read(&caller, Table::Certificates, Query::new()).await;
        let grievances: Vec<Grievance> = self.read(&caller, Table::Grievances, Query::new()).await;
        let taxes: Vec<PropertyTax> = self.read(&caller, Table::PropertyTax, Query::new()).await;

        AdminDashboard::compute(&roles, &certificates, &grievances, &taxes)
    }

    pub async fn list_users(&self, ctx: &ViewContext) -> Vec<UserDirectoryEntry> {
        let caller = ctx.caller();
        let roles: Vec<RoleRecord> = self
            .read(&caller, Table::UserRoles, Query::new().order_by("created_at", false))
            .await;
        let profiles: Vec<Profile> = self.read(&caller, Table::Profiles, Query::new()).await;
        UserDirectoryEntry::join(roles, &profiles)
    }

    pub async fn all_certificates(&self, ctx: &ViewContext) -> Vec<Certificate> {
        self.read(
            &ctx.caller(),
            Table::Certificates,
            Query::new().order_by("created_at", false),
        )
        .await
    }

    pub async fn review_certificate(
        &self,
        ctx: &ViewContext,
        id: CertificateId,
        review: Review,
    ) -> Result<Certificate, ServiceError> {
        let caller = ctx.caller();
        let certificate: Certificate =
            self.fetch(&caller, Table::Certificates, *id.as_uuid()).await?;
        let decision = {
            let mut rng = rand::thread_rng();
            certificate.review(review, Utc::now(), &mut rng)?
        };

        let reviewed: Certificate = self
            .update(&caller, Table::Certificates, *id.as_uuid(), to_row(&decision)?)
            .await?;
        tracing::info!(
            certificate_id = %reviewed.id,
            status = ?reviewed.status,
            certificate_number = reviewed.certificate_number.as_deref().unwrap_or("-"),
            "certificate reviewed"
        );
        Ok(reviewed)
    }

    pub async fn all_property_tax(
        &self,
        ctx: &ViewContext,
    ) -> (Vec<PropertyTax>, TaxCollectionStats) {
        let records: Vec<PropertyTax> = self
            .read(
                &ctx.caller(),
                Table::PropertyTax,
                Query::new().order_by("due_date", false),
            )
            .await;
        let stats = TaxCollectionStats::compute(&records, Utc::now().date_naive());
        (records, stats)
    }

    pub async fn assess_property_tax(
        &self,
        ctx: &ViewContext,
        form: NewPropertyTax,
    ) -> Result<PropertyTax, ServiceError> {
        form.validate()?;
        let record: PropertyTax = self
            .insert(&ctx.caller(), Table::PropertyTax, to_row(&form)?)
            .await?;
        tracing::info!(
            property_tax_id = %record.id,
            user_id = %record.user_id,
            "property tax assessed"
        );
        Ok(record)
    }

    pub async fn all_grievances(&self, ctx: &ViewContext) -> Vec<Grievance> {
        self.read(
            &ctx.caller(),
            Table::Grievances,
            Query::new().order_by("created_at", false),
        )
        .await
    }

    pub async fn update_grievance(
        &self,
        ctx: &ViewContext,
        id: GrievanceId,
        update: GrievanceUpdate,
    ) -> Result<Grievance, ServiceError> {
        let grievance: Grievance = self
            .update(&ctx.caller(), Table::Grievances, *id.as_uuid(), to_row(&update)?)
            .await?;
        tracing::info!(
            grievance_id = %grievance.id,
            status = ?grievance.status,
            "grievance status updated"
        );
        Ok(grievance)
    }

    pub async fn publish_announcement(
        &self,
        ctx: &ViewContext,
        form: NewAnnouncement,
    ) -> Result<Announcement, ServiceError> {
        form.validate()?;
        let announcement: Announcement = self
            .insert(&ctx.caller(), Table::Announcements, to_row(&form)?)
            .await?;
        tracing::info!(announcement_id = %announcement.id, "announcement published");
        Ok(announcement)
    }
}
