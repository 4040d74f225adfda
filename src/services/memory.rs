//! In-process implementation of [`GalleryService`].
//!
//! Keeps accounts, records and contact messages in memory behind a single
//! async lock. Suitable for development and for exercising the HTTP edge.

use std::collections::BTreeMap;

use async_trait::async_trait;
use bcrypt::DEFAULT_COST;
use chrono::Utc;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use super::{text, Fields, GalleryService, Registration, ServiceError, ServiceResult};
use crate::auth::TokenIssuer;
use crate::types::Collection;

const MESSAGE_STATUSES: &[&str] = &["new", "read", "replied"];

/// Fields clients may not set directly on a record
const SYSTEM_FIELDS: &[&str] = &["id", "createdAt", "createdBy", "updatedAt", "updatedBy"];

#[derive(Debug, Clone)]
struct Account {
    id: u64,
    name: String,
    email: String,
    phone: Option<String>,
    password_hash: String,
}

impl Account {
    fn profile(&self, is_admin: bool) -> Value {
        json!({
            "id": self.id.to_string(),
            "name": self.name,
            "email": self.email,
            "phone": self.phone,
            "isAdmin": is_admin,
        })
    }
}

#[derive(Debug, Default)]
struct Table {
    next_id: u64,
    rows: BTreeMap<u64, Fields>,
}

impl Table {
    fn insert(&mut self, mut row: Fields) -> (u64, Fields) {
        self.next_id += 1;
        let id = self.next_id;
        row.insert("id".into(), Value::from(id));
        self.rows.insert(id, row.clone());
        (id, row)
    }

    fn get(&self, id: &str) -> Option<&Fields> {
        let id = id.trim().parse::<u64>().ok()?;
        self.rows.get(&id)
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Fields> {
        let id = id.trim().parse::<u64>().ok()?;
        self.rows.get_mut(&id)
    }

    fn remove(&mut self, id: &str) -> Option<Fields> {
        let id = id.trim().parse::<u64>().ok()?;
        self.rows.remove(&id)
    }
}

#[derive(Debug, Default)]
struct Store {
    next_account_id: u64,
    users: Vec<Account>,
    admins: Vec<Account>,
    artworks: Table,
    exhibitions: Table,
    messages: Table,
}

impl Store {
    fn table(&self, collection: Collection) -> &Table {
        match collection {
            Collection::Artworks => &self.artworks,
            Collection::Exhibitions => &self.exhibitions,
        }
    }

    fn table_mut(&mut self, collection: Collection) -> &mut Table {
        match collection {
            Collection::Artworks => &mut self.artworks,
            Collection::Exhibitions => &mut self.exhibitions,
        }
    }

    fn new_account(
        &mut self,
        name: &str,
        email: &str,
        phone: Option<String>,
        password_hash: String,
    ) -> Account {
        self.next_account_id += 1;
        Account {
            id: self.next_account_id,
            name: name.to_string(),
            email: email.to_string(),
            phone,
            password_hash,
        }
    }
}

pub struct MemoryGalleryService {
    issuer: TokenIssuer,
    hash_cost: u32,
    store: RwLock<Store>,
}

impl MemoryGalleryService {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self {
            issuer,
            hash_cost: DEFAULT_COST,
            store: RwLock::new(Store::default()),
        }
    }

    /// bcrypt cost for passwords hashed from now on
    pub fn with_hash_cost(mut self, cost: u32) -> Self {
        self.hash_cost = cost;
        self
    }

    /// Seed an admin account before the service is shared
    pub fn with_admin(
        mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, ServiceError> {
        let password_hash = hash_password(password, self.hash_cost)?;
        let store = self.store.get_mut();
        let admin = store.new_account(name, email, None, password_hash);
        store.admins.push(admin);
        Ok(self)
    }

    fn login(
        &self,
        accounts: &[Account],
        email: &str,
        password: &str,
        is_admin: bool,
    ) -> ServiceResult {
        let account = match accounts.iter().find(|a| a.email.eq_ignore_ascii_case(email.trim())) {
            Some(account) if verify_password(password, &account.password_hash)? => account,
            _ => return Err(ServiceError::unauthorized("Invalid email or password")),
        };

        let token = self
            .issuer
            .issue(&account.id.to_string(), &account.name, is_admin)
            .map_err(|e| ServiceError::internal(e.to_string()))?;

        let profile_key = if is_admin { "admin" } else { "user" };
        Ok(json!({
            "message": "Login successful",
            "token": token,
            profile_key: account.profile(is_admin),
        }))
    }
}

#[async_trait]
impl GalleryService for MemoryGalleryService {
    async fn register_user(&self, registration: Registration) -> ServiceResult {
        let Registration { name, email, password, phone } = registration;
        if name.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::invalid("Name, email and password must not be empty"));
        }

        // Hash before taking the lock; bcrypt is deliberately slow
        let password_hash = hash_password(&password, self.hash_cost)?;

        let mut store = self.store.write().await;
        if store.users.iter().any(|u| u.email.eq_ignore_ascii_case(email.trim())) {
            return Err(ServiceError::invalid("Email already registered"));
        }

        let phone = phone.filter(|p| !p.trim().is_empty());
        let account = store.new_account(name.trim(), email.trim(), phone, password_hash);
        let profile = account.profile(false);
        store.users.push(account);

        tracing::debug!("Registered user {}", profile["id"]);
        Ok(json!({
            "message": "User registered successfully",
            "user": profile,
        }))
    }

    async fn login_user(&self, email: &str, password: &str) -> ServiceResult {
        let store = self.store.read().await;
        self.login(&store.users, email, password, false)
    }

    async fn login_admin(&self, email: &str, password: &str) -> ServiceResult {
        let store = self.store.read().await;
        self.login(&store.admins, email, password, true)
    }

    async fn list_records(&self, collection: Collection) -> ServiceResult {
        let store = self.store.read().await;
        let rows: Vec<Value> = store
            .table(collection)
            .rows
            .values()
            .cloned()
            .map(Value::Object)
            .collect();

        Ok(json!({ collection.plural(): rows }))
    }

    async fn get_record(&self, collection: Collection, id: &str) -> ServiceResult {
        let store = self.store.read().await;
        let row = store
            .table(collection)
            .get(id)
            .cloned()
            .ok_or_else(|| not_found(collection))?;

        Ok(json!({ collection.singular(): row }))
    }

    async fn create_record(
        &self,
        collection: Collection,
        fields: Fields,
        caller: &str,
    ) -> ServiceResult {
        let missing: Vec<&str> = required_fields(collection)
            .iter()
            .copied()
            .filter(|f| text(&fields, f).map_or(true, |v| v.trim().is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(ServiceError::invalid(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        let mut row = without_system_fields(fields);
        apply_defaults(collection, &mut row);
        row.insert("createdAt".into(), Value::from(Utc::now().to_rfc3339()));
        row.insert("createdBy".into(), Value::from(caller));

        let mut store = self.store.write().await;
        let (id, row) = store.table_mut(collection).insert(row);

        tracing::info!("{} {} created by {}", collection.label(), id, caller);
        Ok(json!({
            "message": format!("{} created successfully", collection.label()),
            collection.singular(): row,
        }))
    }

    async fn update_record(
        &self,
        collection: Collection,
        id: &str,
        fields: Fields,
        caller: &str,
    ) -> ServiceResult {
        let mut store = self.store.write().await;
        let row = store
            .table_mut(collection)
            .get_mut(id)
            .ok_or_else(|| not_found(collection))?;

        row.extend(without_system_fields(fields));
        row.insert("updatedAt".into(), Value::from(Utc::now().to_rfc3339()));
        row.insert("updatedBy".into(), Value::from(caller));

        tracing::info!("{} {} updated by {}", collection.label(), id, caller);
        Ok(json!({
            "message": format!("{} updated successfully", collection.label()),
            collection.singular(): row.clone(),
        }))
    }

    async fn delete_record(&self, collection: Collection, id: &str, caller: &str) -> ServiceResult {
        let mut store = self.store.write().await;
        store
            .table_mut(collection)
            .remove(id)
            .ok_or_else(|| not_found(collection))?;

        tracing::info!("{} {} deleted by {}", collection.label(), id, caller);
        Ok(json!({
            "message": format!("{} deleted successfully", collection.label()),
        }))
    }

    async fn create_contact_message(&self, fields: Fields) -> ServiceResult {
        let mut row = Fields::new();
        for key in ["name", "email", "phone", "message"] {
            row.insert(key.into(), text(&fields, key).map(Value::from).unwrap_or(Value::Null));
        }
        row.insert("status".into(), Value::from("new"));
        row.insert("date".into(), Value::from(Utc::now().to_rfc3339()));

        let mut store = self.store.write().await;
        let (id, _) = store.messages.insert(row);

        Ok(json!({ "success": true, "message_id": id }))
    }

    async fn list_contact_messages(&self) -> ServiceResult {
        let store = self.store.read().await;
        // Newest first
        let messages: Vec<Value> = store
            .messages
            .rows
            .values()
            .rev()
            .cloned()
            .map(Value::Object)
            .collect();

        Ok(json!({ "messages": messages }))
    }

    async fn update_message_status(&self, message_id: &str, status: &str) -> ServiceResult {
        if !MESSAGE_STATUSES.contains(&status) {
            return Err(ServiceError::invalid(format!(
                "Invalid status '{}': expected one of {}",
                status,
                MESSAGE_STATUSES.join(", ")
            )));
        }

        let mut store = self.store.write().await;
        let row = store
            .messages
            .get_mut(message_id)
            .ok_or_else(|| ServiceError::not_found("Message not found"))?;
        row.insert("status".into(), Value::from(status));

        Ok(json!({ "success": true }))
    }
}

fn required_fields(collection: Collection) -> &'static [&'static str] {
    match collection {
        Collection::Artworks => &["title", "artist", "price"],
        Collection::Exhibitions => &[
            "title",
            "location",
            "startDate",
            "endDate",
            "ticketPrice",
            "totalSlots",
        ],
    }
}

fn apply_defaults(collection: Collection, row: &mut Fields) {
    match collection {
        Collection::Artworks => {
            row.entry("status").or_insert_with(|| Value::from("available"));
        }
        Collection::Exhibitions => {
            row.entry("status").or_insert_with(|| Value::from("upcoming"));
            if let Some(total) = row.get("totalSlots").cloned() {
                row.entry("availableSlots").or_insert(total);
            }
        }
    }
}

fn not_found(collection: Collection) -> ServiceError {
    ServiceError::not_found(format!("{} not found", collection.label()))
}

fn without_system_fields(mut fields: Fields) -> Fields {
    for key in SYSTEM_FIELDS {
        fields.remove(*key);
    }
    fields
}

fn hash_password(password: &str, cost: u32) -> Result<String, ServiceError> {
    bcrypt::hash(password, cost)
        .map_err(|e| ServiceError::internal(format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> Result<bool, ServiceError> {
    bcrypt::verify(password, hash)
        .map_err(|e| ServiceError::internal(format!("Failed to verify password: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::CredentialVerifier;
    use crate::services::FailureKind;

    const SECRET: &str = "memory-secret";

    fn service() -> MemoryGalleryService {
        MemoryGalleryService::new(TokenIssuer::new(SECRET, 1).unwrap())
            .with_hash_cost(crate::config::BCRYPT_MIN_COST)
            .with_admin("Curator", "admin@example.com", "s3cret")
            .unwrap()
    }

    fn fields(value: Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn password_hashes_are_salted() {
        let a = hash_password("pw", crate::config::BCRYPT_MIN_COST).unwrap();
        let b = hash_password("pw", crate::config::BCRYPT_MIN_COST).unwrap();
        assert_ne!(a, b);
        assert!(a.starts_with("$2"));
        assert!(verify_password("pw", &a).unwrap());
        assert!(!verify_password("other", &a).unwrap());
    }

    #[tokio::test]
    async fn records_are_readable_concurrently() {
        let svc = service();
        svc.create_record(
            Collection::Artworks,
            fields(json!({ "title": "Dusk", "artist": "Njeri", "price": 10 })),
            "1",
        )
        .await
        .unwrap();

        // A held read guard must not block public reads
        let guard = svc.store.read().await;
        let (list, shown) = tokio::join!(
            svc.list_records(Collection::Artworks),
            svc.get_record(Collection::Artworks, "1"),
        );
        drop(guard);

        assert_eq!(list.unwrap()["artworks"].as_array().map(Vec::len), Some(1));
        assert_eq!(shown.unwrap()["artwork"]["title"], "Dusk");
    }

    #[tokio::test]
    async fn admin_login_issues_admin_token() {
        let svc = service();
        let res = svc.login_admin("ADMIN@example.com", "s3cret").await.unwrap();

        let claims = CredentialVerifier::new(SECRET)
            .verify_token(res["token"].as_str().unwrap())
            .unwrap();
        assert!(claims.is_admin());
        assert_eq!(res["admin"]["email"], "admin@example.com");

        let err = svc.login_admin("admin@example.com", "wrong").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Unauthorized);
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let svc = service();
        let reg = Registration {
            name: "Amani".into(),
            email: "amani@example.com".into(),
            password: "pw".into(),
            phone: None,
        };

        svc.register_user(reg.clone()).await.unwrap();
        let err = svc.register_user(reg).await.unwrap_err();
        assert_eq!(err.kind, FailureKind::Invalid);

        let res = svc.login_user("amani@example.com", "pw").await.unwrap();
        assert_eq!(res["user"]["isAdmin"], false);
    }

    #[tokio::test]
    async fn artwork_lifecycle() {
        let svc = service();
        let created = svc
            .create_record(
                Collection::Artworks,
                fields(json!({ "title": "Dusk", "artist": "Njeri", "price": "120", "id": 99 })),
                "1",
            )
            .await
            .unwrap();

        let artwork = &created["artwork"];
        assert_eq!(artwork["id"], 1);
        assert_eq!(artwork["status"], "available");
        assert_eq!(artwork["createdBy"], "1");

        svc.update_record(Collection::Artworks, "1", fields(json!({ "status": "sold" })), "1")
            .await
            .unwrap();
        let shown = svc.get_record(Collection::Artworks, "1").await.unwrap();
        assert_eq!(shown["artwork"]["status"], "sold");

        svc.delete_record(Collection::Artworks, "1", "1").await.unwrap();
        let err = svc.get_record(Collection::Artworks, "1").await.unwrap_err();
        assert_eq!(err.kind, FailureKind::NotFound);
        assert_eq!(err.message, "Artwork not found");
    }

    #[tokio::test]
    async fn exhibition_requires_its_fields() {
        let svc = service();
        let err = svc
            .create_record(Collection::Exhibitions, fields(json!({ "title": "Roots" })), "1")
            .await
            .unwrap_err();

        assert_eq!(err.kind, FailureKind::Invalid);
        assert!(err.message.contains("location"));
        assert!(err.message.contains("totalSlots"));
    }

    #[tokio::test]
    async fn exhibition_available_slots_default_to_total() {
        let svc = service();
        let created = svc
            .create_record(
                Collection::Exhibitions,
                fields(json!({
                    "title": "Roots",
                    "location": "Nairobi",
                    "startDate": "2026-01-10",
                    "endDate": "2026-02-10",
                    "ticketPrice": "500",
                    "totalSlots": "40"
                })),
                "1",
            )
            .await
            .unwrap();

        assert_eq!(created["exhibition"]["availableSlots"], "40");
        assert_eq!(created["exhibition"]["status"], "upcoming");
    }

    #[tokio::test]
    async fn message_status_updates() {
        let svc = service();
        let res = svc
            .create_contact_message(fields(json!({
                "name": "Zawadi",
                "email": "z@example.com",
                "message": "Hi"
            })))
            .await
            .unwrap();
        let id = res["message_id"].to_string();

        assert!(svc.update_message_status(&id, "read").await.is_ok());
        let bad = svc.update_message_status(&id, "archived").await.unwrap_err();
        assert_eq!(bad.kind, FailureKind::Invalid);
        let missing = svc.update_message_status("404", "read").await.unwrap_err();
        assert_eq!(missing.kind, FailureKind::NotFound);

        let listed = svc.list_contact_messages().await.unwrap();
        assert_eq!(listed["messages"][0]["status"], "read");
    }
}
