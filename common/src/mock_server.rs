// S3 Quota Harness
// Copyright 2025 The s3-quota-harness Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! In-process mock of the CSM, IAM and S3 endpoints
//!
//! One axum server answers all three APIs: paths under `/api/` are CSM,
//! `POST /` is IAM and everything else is S3. State lives in memory and is
//! reachable through [`MockState`] so tests can seed accounts and inspect
//! what the harness did.
//!
//! Quotas set through CSM are enforced on S3 writes. A `user` quota applies
//! to the S3 account whose access key equals the quota uid; a `bucket` quota
//! to the bucket of that name. A write past either limit gets
//! `403 QuotaExceeded`.

use axum::Router;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

pub const ROOT_ACCESS_KEY: &str = "harness-root";
pub const ROOT_SECRET_KEY: &str = "harness-root-secret";
pub const CSM_ADMIN_USER: &str = "admin";
pub const CSM_ADMIN_PASSWORD: &str = "Seagate@1";
pub const CSM_MONITOR_USER: &str = "monitor";
pub const CSM_MONITOR_PASSWORD: &str = "Monitor@1";
pub const MOCK_REGION: &str = "us-east-1";

const LOGIN_PATH: &str = "/api/v2/login";
const QUOTA_PREFIX: &str = "/api/v2/s3/iam/users/";
const QUOTA_SUFFIX: &str = "/quota";
const S3_XMLNS: &str = "http://s3.amazonaws.com/doc/2006-03-01/";
const IAM_XMLNS: &str = "https://iam.amazonaws.com/doc/2010-05-08/";
const NULL_VERSION: &str = "null";

#[derive(Clone, Debug)]
struct CsmAccount {
    password: String,
    can_write: bool,
}

#[derive(Clone, Debug)]
struct StoredQuota {
    quota_type: String,
    enabled: bool,
    max_size: u64,
    max_objects: u64,
}

#[derive(Clone, Debug)]
struct IamUserRecord {
    user_id: String,
    create_date: DateTime<Utc>,
}

#[derive(Clone, Debug)]
struct VersionRecord {
    version_id: String,
    /// `None` for a delete marker
    data: Option<Bytes>,
    etag: String,
    last_modified: DateTime<Utc>,
}

#[derive(Clone, Debug)]
struct BucketRecord {
    owner: String,
    created: DateTime<Utc>,
    versioning: Option<String>,
    /// Versions of each key, oldest first
    objects: BTreeMap<String, Vec<VersionRecord>>,
}

impl BucketRecord {
    fn live_objects(&self) -> impl Iterator<Item = (&String, &VersionRecord, &Bytes)> {
        self.objects.iter().filter_map(|(k, versions)| {
            let latest = versions.last()?;
            latest.data.as_ref().map(|d| (k, latest, d))
        })
    }

    fn usage(&self) -> (u64, u64) {
        self.live_objects()
            .fold((0, 0), |(size, count), (_, _, d)| (size + d.len() as u64, count + 1))
    }

    fn is_versioned(&self) -> bool {
        self.versioning.is_some()
    }
}

#[derive(Default, Debug)]
struct Inner {
    accounts: HashMap<String, String>,
    csm_accounts: HashMap<String, CsmAccount>,
    /// token -> may modify quotas
    sessions: HashMap<String, bool>,
    quotas: HashMap<String, StoredQuota>,
    iam_users: BTreeMap<String, IamUserRecord>,
    buckets: BTreeMap<String, BucketRecord>,
    seq: u64,
}

impl Inner {
    fn next_id(&mut self) -> String {
        self.seq += 1;
        format!("{:016X}", self.seq)
    }
}

/// Shared state of a [`MockServer`].
#[derive(Clone, Debug, Default)]
pub struct MockState {
    inner: Arc<Mutex<Inner>>,
}

impl MockState {
    pub fn new() -> Self {
        let state = Self::default();
        state.add_account(ROOT_ACCESS_KEY, ROOT_SECRET_KEY);
        state.add_csm_user(CSM_ADMIN_USER, CSM_ADMIN_PASSWORD, true);
        state.add_csm_user(CSM_MONITOR_USER, CSM_MONITOR_PASSWORD, false);
        state
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers an S3/IAM key pair.
    pub fn add_account(&self, access_key: &str, secret_key: &str) {
        self.lock()
            .accounts
            .insert(access_key.to_string(), secret_key.to_string());
    }

    /// Registers a CSM login; only `can_write` accounts may set quotas.
    pub fn add_csm_user(&self, username: &str, password: &str, can_write: bool) {
        self.lock().csm_accounts.insert(
            username.to_string(),
            CsmAccount {
                password: password.to_string(),
                can_write,
            },
        );
    }

    pub fn has_bucket(&self, bucket: &str) -> bool {
        self.lock().buckets.contains_key(bucket)
    }

    pub fn has_iam_user(&self, user_name: &str) -> bool {
        self.lock().iam_users.contains_key(user_name)
    }

    /// Number of keys in `bucket` whose latest version is not a delete marker.
    pub fn live_object_count(&self, bucket: &str) -> usize {
        self.lock()
            .buckets
            .get(bucket)
            .map(|b| b.live_objects().count())
            .unwrap_or(0)
    }

    /// Number of versions and delete markers kept for `key`.
    pub fn version_count(&self, bucket: &str, key: &str) -> usize {
        self.lock()
            .buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key))
            .map(Vec::len)
            .unwrap_or(0)
    }

    pub fn quota_enabled(&self, uid: &str) -> Option<bool> {
        self.lock().quotas.get(uid).map(|q| q.enabled)
    }
}

/// A running mock server bound to a random local port.
pub struct MockServer {
    pub addr: SocketAddr,
    pub state: MockState,
}

impl MockServer {
    pub async fn start() -> Self {
        let state = MockState::new();
        let app = Router::new().fallback(handle).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }
}

async fn handle(
    State(state): State<MockState>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri.path().to_string();
    let query = parse_pairs(uri.query().unwrap_or_default());
    log::debug!("mock {method} {uri}");

    if path.starts_with("/api/") {
        return csm(&state, &method, &path, &headers, &body);
    }

    if method == Method::POST && path == "/" {
        return match authenticate(&state, &headers, "iam", &body) {
            Ok(_) => iam(&state, &body),
            Err(e) => iam_error(&state, e.0, e.1, e.2),
        };
    }

    match authenticate(&state, &headers, "s3", &body) {
        Ok(access_key) => s3(&state, &method, &path, &query, body, &access_key),
        Err(e) => s3_error(&state, &method, e.0, e.1, e.2, &path),
    }
}

// ----------------------------------------------------------------------
// auth

type Rejection = (StatusCode, &'static str, String);

/// Checks the SigV4 credential scope and payload hash; returns the access key.
fn authenticate(
    state: &MockState,
    headers: &HeaderMap,
    service: &str,
    body: &Bytes,
) -> Result<String, Rejection> {
    let denied = |code: &'static str, msg: String| (StatusCode::FORBIDDEN, code, msg);

    let auth = header_str(headers, "authorization")
        .ok_or_else(|| denied("AccessDenied", "missing Authorization header".into()))?;
    let credential = auth
        .strip_prefix("AWS4-HMAC-SHA256 Credential=")
        .and_then(|rest| rest.split(',').next())
        .ok_or_else(|| denied("AccessDenied", format!("unsupported Authorization: {auth}")))?;

    let scope: Vec<&str> = credential.split('/').collect();
    let [access_key, _date, region, scope_service, terminator] = scope[..] else {
        return Err(denied("AccessDenied", format!("malformed credential {credential}")));
    };
    if terminator != "aws4_request" || region != MOCK_REGION || scope_service != service {
        return Err(denied(
            "SignatureDoesNotMatch",
            format!("credential scope {credential} does not match {MOCK_REGION}/{service}"),
        ));
    }
    if !state.lock().accounts.contains_key(access_key) {
        return Err(denied(
            "InvalidAccessKeyId",
            format!("unknown access key {access_key}"),
        ));
    }
    if header_str(headers, "x-amz-date").is_none() {
        return Err(denied("AccessDenied", "missing x-amz-date".into()));
    }
    let sha = hex::encode(Sha256::digest(body));
    if header_str(headers, "x-amz-content-sha256") != Some(sha.as_str()) {
        return Err((
            StatusCode::BAD_REQUEST,
            "XAmzContentSHA256Mismatch",
            "payload hash does not match x-amz-content-sha256".into(),
        ));
    }
    Ok(access_key.to_string())
}

// ----------------------------------------------------------------------
// CSM

fn csm(state: &MockState, method: &Method, path: &str, headers: &HeaderMap, body: &Bytes) -> Response {
    if *method == Method::POST && path == LOGIN_PATH {
        return csm_login(state, body);
    }

    let Some(uid) = path
        .strip_prefix(QUOTA_PREFIX)
        .and_then(|p| p.strip_suffix(QUOTA_SUFFIX))
        .filter(|uid| !uid.is_empty() && !uid.contains('/'))
    else {
        return json_response(StatusCode::NOT_FOUND, json!({"message": "no such endpoint"}));
    };

    let can_write = match header_str(headers, "authorization")
        .and_then(|t| state.lock().sessions.get(t).copied())
    {
        Some(v) => v,
        None => return json_response(StatusCode::UNAUTHORIZED, json!({"message": "invalid token"})),
    };

    match *method {
        Method::GET => match state.lock().quotas.get(uid) {
            Some(q) => json_response(
                StatusCode::OK,
                json!({
                    "quota_type": q.quota_type,
                    "enabled": q.enabled,
                    "max_size": q.max_size,
                    "max_objects": q.max_objects,
                    "max_size_kb": q.max_size as f64 / 1000.0,
                    "check_on_raw": false,
                }),
            ),
            None => json_response(
                StatusCode::NOT_FOUND,
                json!({"message": format!("no quota for {uid}")}),
            ),
        },
        Method::PUT => {
            if !can_write {
                return json_response(StatusCode::FORBIDDEN, json!({"message": "access denied"}));
            }
            match parse_quota(body) {
                Some(q) => {
                    state.lock().quotas.insert(uid.to_string(), q);
                    json_response(StatusCode::OK, json!({}))
                }
                None => json_response(
                    StatusCode::BAD_REQUEST,
                    json!({"message": "invalid quota payload"}),
                ),
            }
        }
        _ => json_response(StatusCode::METHOD_NOT_ALLOWED, json!({"message": "method not allowed"})),
    }
}

fn csm_login(state: &MockState, body: &Bytes) -> Response {
    let creds: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let username = creds["username"].as_str().unwrap_or_default();
    let password = creds["password"].as_str().unwrap_or_default();

    let mut inner = state.lock();
    let can_write = match inner.csm_accounts.get(username) {
        Some(a) if a.password == password => a.can_write,
        _ => {
            return json_response(StatusCode::UNAUTHORIZED, json!({"message": "invalid login"}));
        }
    };
    let token = format!("Bearer {}", uuid::Uuid::new_v4().simple());
    inner.sessions.insert(token.clone(), can_write);

    let mut resp = json_response(StatusCode::OK, json!({"username": username}));
    if let Ok(v) = HeaderValue::from_str(&token) {
        resp.headers_mut().insert(http::header::AUTHORIZATION, v);
    }
    resp
}

fn parse_quota(body: &Bytes) -> Option<StoredQuota> {
    let v: Value = serde_json::from_slice(body).ok()?;
    let quota_type = v["quota_type"].as_str()?.to_string();
    if quota_type != "user" && quota_type != "bucket" {
        return None;
    }
    let enabled = match &v["enabled"] {
        Value::Bool(b) => *b,
        Value::String(s) => s.eq_ignore_ascii_case("true"),
        _ => return None,
    };
    Some(StoredQuota {
        quota_type,
        enabled,
        max_size: v["max_size"].as_u64()?,
        max_objects: v["max_objects"].as_u64()?,
    })
}

// ----------------------------------------------------------------------
// IAM

fn iam(state: &MockState, body: &Bytes) -> Response {
    let form: HashMap<String, String> = parse_pairs(&String::from_utf8_lossy(body))
        .into_iter()
        .collect();
    let action = form.get("Action").map(String::as_str).unwrap_or_default();
    let user_name = form.get("UserName").cloned().unwrap_or_default();

    match action {
        "CreateUser" => {
            let mut inner = state.lock();
            if inner.iam_users.contains_key(&user_name) {
                drop(inner);
                return iam_error(
                    state,
                    StatusCode::CONFLICT,
                    "EntityAlreadyExists",
                    format!("User with name {user_name} already exists."),
                );
            }
            let record = IamUserRecord {
                user_id: format!("AIDA{}", inner.next_id()),
                create_date: Utc::now(),
            };
            let user = user_xml(&user_name, &record);
            inner.iam_users.insert(user_name, record);
            let request_id = inner.next_id();
            iam_ok(
                "CreateUser",
                &format!("<CreateUserResult>{user}</CreateUserResult>"),
                &request_id,
            )
        }
        "DeleteUser" => {
            let mut inner = state.lock();
            if inner.iam_users.remove(&user_name).is_none() {
                drop(inner);
                return iam_error(
                    state,
                    StatusCode::NOT_FOUND,
                    "NoSuchEntity",
                    format!("The user with name {user_name} cannot be found."),
                );
            }
            let request_id = inner.next_id();
            iam_ok("DeleteUser", "", &request_id)
        }
        "ListUsers" => {
            let mut inner = state.lock();
            let max_items = form
                .get("MaxItems")
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(100)
                .max(1);
            let marker = form.get("Marker").cloned().unwrap_or_default();
            let page: Vec<(&String, &IamUserRecord)> = inner
                .iam_users
                .iter()
                .filter(|(name, _)| marker.is_empty() || name.as_str() > marker.as_str())
                .take(max_items + 1)
                .collect();
            let truncated = page.len() > max_items;
            let page = &page[..page.len().min(max_items)];

            let mut result = String::from("<ListUsersResult><Users>");
            for (name, record) in page {
                result.push_str(&user_xml(name, record).replace("<User>", "<member>").replace("</User>", "</member>"));
            }
            result.push_str("</Users>");
            result.push_str(&format!("<IsTruncated>{truncated}</IsTruncated>"));
            if truncated {
                if let Some((last, _)) = page.last() {
                    result.push_str(&format!("<Marker>{}</Marker>", xml_escape(last)));
                }
            }
            result.push_str("</ListUsersResult>");
            let request_id = inner.next_id();
            iam_ok("ListUsers", &result, &request_id)
        }
        other => iam_error(
            state,
            StatusCode::BAD_REQUEST,
            "InvalidAction",
            format!("unsupported action {other}"),
        ),
    }
}

fn user_xml(name: &str, record: &IamUserRecord) -> String {
    format!(
        "<User><Path>/</Path><UserName>{name}</UserName><UserId>{id}</UserId>\
         <Arn>arn:aws:iam::000000000000:user/{name}</Arn><CreateDate>{date}</CreateDate></User>",
        name = xml_escape(name),
        id = record.user_id,
        date = record.create_date.to_rfc3339_opts(SecondsFormat::Secs, true),
    )
}

fn iam_ok(action: &str, result: &str, request_id: &str) -> Response {
    xml_response(
        StatusCode::OK,
        format!(
            "<{action}Response xmlns=\"{IAM_XMLNS}\">{result}\
             <ResponseMetadata><RequestId>{request_id}</RequestId></ResponseMetadata>\
             </{action}Response>"
        ),
    )
}

fn iam_error(state: &MockState, status: StatusCode, code: &str, message: String) -> Response {
    let request_id = state.lock().next_id();
    xml_response(
        status,
        format!(
            "<ErrorResponse xmlns=\"{IAM_XMLNS}\"><Error><Type>Sender</Type><Code>{code}</Code>\
             <Message>{}</Message></Error><RequestId>{request_id}</RequestId></ErrorResponse>",
            xml_escape(&message)
        ),
    )
}

// ----------------------------------------------------------------------
// S3

fn s3(
    state: &MockState,
    method: &Method,
    path: &str,
    query: &[(String, String)],
    body: Bytes,
    access_key: &str,
) -> Response {
    let trimmed = path.trim_start_matches('/');
    let (bucket, key) = match trimmed.split_once('/') {
        Some((b, k)) => (b.to_string(), urlencoding::decode(k).map(|k| k.into_owned()).unwrap_or_default()),
        None => (trimmed.to_string(), String::new()),
    };
    let q = |name: &str| query.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str());

    let result = match (method.clone(), bucket.is_empty(), key.is_empty()) {
        (Method::GET, true, _) => list_buckets(state, access_key),
        (_, true, _) => Err(S3Err::new(StatusCode::METHOD_NOT_ALLOWED, "MethodNotAllowed", "")),
        (Method::PUT, false, true) if q("versioning").is_some() => {
            put_bucket_versioning(state, &bucket, &body)
        }
        (Method::GET, false, true) if q("versioning").is_some() => {
            get_bucket_versioning(state, &bucket)
        }
        (Method::GET, false, true) if q("versions").is_some() => {
            list_object_versions(state, &bucket, &q)
        }
        (Method::GET, false, true) => list_objects_v2(state, &bucket, &q),
        (Method::PUT, false, true) => create_bucket(state, &bucket, access_key),
        (Method::DELETE, false, true) => delete_bucket(state, &bucket),
        (Method::PUT, false, false) => put_object(state, &bucket, &key, body),
        (Method::GET, false, false) => get_object(state, &bucket, &key, q("versionId"), false),
        (Method::HEAD, false, false) => get_object(state, &bucket, &key, q("versionId"), true),
        (Method::DELETE, false, false) => delete_object(state, &bucket, &key, q("versionId")),
        _ => Err(S3Err::new(StatusCode::METHOD_NOT_ALLOWED, "MethodNotAllowed", "")),
    };

    match result {
        Ok(resp) => resp,
        Err(e) => {
            let mut resp = s3_error(state, method, e.status, e.code, e.message, path);
            for (k, v) in e.headers {
                if let Ok(v) = HeaderValue::from_str(&v) {
                    resp.headers_mut().insert(k, v);
                }
            }
            resp
        }
    }
}

struct S3Err {
    status: StatusCode,
    code: &'static str,
    message: String,
    headers: Vec<(&'static str, String)>,
}

impl S3Err {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            headers: Vec::new(),
        }
    }

    fn no_such_bucket(bucket: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "NoSuchBucket",
            format!("The specified bucket {bucket} does not exist"),
        )
    }
}

type S3Result = Result<Response, S3Err>;

fn list_buckets(state: &MockState, access_key: &str) -> S3Result {
    let inner = state.lock();
    let mut xml = format!(
        "<ListAllMyBucketsResult xmlns=\"{S3_XMLNS}\"><Owner><ID>{access_key}</ID></Owner><Buckets>"
    );
    for (name, b) in inner.buckets.iter().filter(|(_, b)| b.owner == access_key) {
        xml.push_str(&format!(
            "<Bucket><Name>{name}</Name><CreationDate>{}</CreationDate></Bucket>",
            iso_millis(b.created)
        ));
    }
    xml.push_str("</Buckets></ListAllMyBucketsResult>");
    Ok(xml_response(StatusCode::OK, xml))
}

fn create_bucket(state: &MockState, bucket: &str, access_key: &str) -> S3Result {
    let mut inner = state.lock();
    if inner.buckets.contains_key(bucket) {
        return Err(S3Err::new(
            StatusCode::CONFLICT,
            "BucketAlreadyOwnedByYou",
            "Your previous request to create the named bucket succeeded and you already own it.",
        ));
    }
    inner.buckets.insert(
        bucket.to_string(),
        BucketRecord {
            owner: access_key.to_string(),
            created: Utc::now(),
            versioning: None,
            objects: BTreeMap::new(),
        },
    );
    let mut resp = StatusCode::OK.into_response();
    insert_header(&mut resp, "location", &format!("/{bucket}"));
    Ok(resp)
}

fn delete_bucket(state: &MockState, bucket: &str) -> S3Result {
    let mut inner = state.lock();
    let b = inner
        .buckets
        .get(bucket)
        .ok_or_else(|| S3Err::no_such_bucket(bucket))?;
    if b.objects.values().any(|v| !v.is_empty()) {
        return Err(S3Err::new(
            StatusCode::CONFLICT,
            "BucketNotEmpty",
            "The bucket you tried to delete is not empty",
        ));
    }
    inner.buckets.remove(bucket);
    Ok(StatusCode::NO_CONTENT.into_response())
}

fn put_bucket_versioning(state: &MockState, bucket: &str, body: &Bytes) -> S3Result {
    let malformed = || S3Err::new(StatusCode::BAD_REQUEST, "MalformedXML", "invalid versioning configuration");
    let root = xmltree::Element::parse(body.as_ref()).map_err(|_| malformed())?;
    let status = root
        .get_child("Status")
        .and_then(|s| s.get_text())
        .map(|s| s.to_string())
        .ok_or_else(malformed)?;
    if status != "Enabled" && status != "Suspended" {
        return Err(malformed());
    }

    let mut inner = state.lock();
    let b = inner
        .buckets
        .get_mut(bucket)
        .ok_or_else(|| S3Err::no_such_bucket(bucket))?;
    b.versioning = Some(status);
    Ok(StatusCode::OK.into_response())
}

fn get_bucket_versioning(state: &MockState, bucket: &str) -> S3Result {
    let inner = state.lock();
    let b = inner
        .buckets
        .get(bucket)
        .ok_or_else(|| S3Err::no_such_bucket(bucket))?;
    let status = b
        .versioning
        .as_ref()
        .map(|s| format!("<Status>{s}</Status>"))
        .unwrap_or_default();
    Ok(xml_response(
        StatusCode::OK,
        format!("<VersioningConfiguration xmlns=\"{S3_XMLNS}\">{status}</VersioningConfiguration>"),
    ))
}

fn list_objects_v2<'a>(
    state: &MockState,
    bucket: &str,
    q: &dyn Fn(&str) -> Option<&'a str>,
) -> S3Result {
    let inner = state.lock();
    let b = inner
        .buckets
        .get(bucket)
        .ok_or_else(|| S3Err::no_such_bucket(bucket))?;
    let prefix = q("prefix").unwrap_or_default();
    let max_keys = q("max-keys")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(1000)
        .max(1);
    let start_after = q("continuation-token").unwrap_or_default();

    let matching: Vec<(&String, &VersionRecord, &Bytes)> = b
        .live_objects()
        .filter(|(k, _, _)| k.starts_with(prefix) && k.as_str() > start_after)
        .take(max_keys + 1)
        .collect();
    let truncated = matching.len() > max_keys;
    let page = &matching[..matching.len().min(max_keys)];

    let mut xml = format!(
        "<ListBucketResult xmlns=\"{S3_XMLNS}\"><Name>{bucket}</Name><Prefix>{}</Prefix>\
         <KeyCount>{}</KeyCount><MaxKeys>{max_keys}</MaxKeys><IsTruncated>{truncated}</IsTruncated>",
        xml_escape(prefix),
        page.len()
    );
    for (key, v, data) in page {
        xml.push_str(&format!(
            "<Contents><Key>{}</Key><LastModified>{}</LastModified><ETag>\"{}\"</ETag>\
             <Size>{}</Size><StorageClass>STANDARD</StorageClass></Contents>",
            xml_escape(key),
            iso_millis(v.last_modified),
            v.etag,
            data.len()
        ));
    }
    if truncated {
        if let Some((last, _, _)) = page.last() {
            xml.push_str(&format!(
                "<NextContinuationToken>{}</NextContinuationToken>",
                xml_escape(last)
            ));
        }
    }
    xml.push_str("</ListBucketResult>");
    Ok(xml_response(StatusCode::OK, xml))
}

fn list_object_versions<'a>(
    state: &MockState,
    bucket: &str,
    q: &dyn Fn(&str) -> Option<&'a str>,
) -> S3Result {
    let inner = state.lock();
    let b = inner
        .buckets
        .get(bucket)
        .ok_or_else(|| S3Err::no_such_bucket(bucket))?;
    let prefix = q("prefix").unwrap_or_default();

    let mut xml = format!(
        "<ListVersionsResult xmlns=\"{S3_XMLNS}\"><Name>{bucket}</Name><Prefix>{}</Prefix>\
         <IsTruncated>false</IsTruncated>",
        xml_escape(prefix)
    );
    for (key, versions) in b.objects.iter().filter(|(k, _)| k.starts_with(prefix)) {
        let latest = versions.len().saturating_sub(1);
        // newest first, as S3 lists them
        for (i, v) in versions.iter().enumerate().rev() {
            let common = format!(
                "<Key>{}</Key><VersionId>{}</VersionId><IsLatest>{}</IsLatest>\
                 <LastModified>{}</LastModified>",
                xml_escape(key),
                v.version_id,
                i == latest,
                iso_millis(v.last_modified)
            );
            match &v.data {
                Some(d) => xml.push_str(&format!(
                    "<Version>{common}<ETag>\"{}\"</ETag><Size>{}</Size>\
                     <StorageClass>STANDARD</StorageClass></Version>",
                    v.etag,
                    d.len()
                )),
                None => xml.push_str(&format!("<DeleteMarker>{common}</DeleteMarker>")),
            }
        }
    }
    xml.push_str("</ListVersionsResult>");
    Ok(xml_response(StatusCode::OK, xml))
}

/// Returns an error when writing `size` more bytes as a new object of
/// `bucket` exceeds a quota of its owner or of the bucket.
fn check_quota(inner: &Inner, bucket: &str, size: u64) -> Result<(), S3Err> {
    let Some(b) = inner.buckets.get(bucket) else {
        return Ok(());
    };
    let exceeded = |quota: Option<&StoredQuota>, kind: &str, (used_size, used_objects): (u64, u64)| {
        match quota {
            Some(q) if q.enabled && q.quota_type == kind => {
                used_size + size > q.max_size || used_objects + 1 > q.max_objects
            }
            _ => false,
        }
    };

    let owner_usage = inner
        .buckets
        .values()
        .filter(|other| other.owner == b.owner)
        .map(BucketRecord::usage)
        .fold((0, 0), |(s, c), (s2, c2)| (s + s2, c + c2));

    if exceeded(inner.quotas.get(&b.owner), "user", owner_usage)
        || exceeded(inner.quotas.get(bucket), "bucket", b.usage())
    {
        return Err(S3Err::new(
            StatusCode::FORBIDDEN,
            "QuotaExceeded",
            "Bucket or user quota exceeded",
        ));
    }
    Ok(())
}

fn put_object(state: &MockState, bucket: &str, key: &str, body: Bytes) -> S3Result {
    let mut inner = state.lock();
    if !inner.buckets.contains_key(bucket) {
        return Err(S3Err::no_such_bucket(bucket));
    }
    check_quota(&inner, bucket, body.len() as u64)?;

    let new_id = inner.next_id();
    let etag = hex::encode(&Sha256::digest(&body)[..16]);
    let Some(b) = inner.buckets.get_mut(bucket) else {
        return Err(S3Err::no_such_bucket(bucket));
    };
    let version_id = match b.versioning.as_deref() {
        Some("Enabled") => new_id,
        _ => NULL_VERSION.to_string(),
    };
    let versioned = b.is_versioned();
    let versions = b.objects.entry(key.to_string()).or_default();
    versions.retain(|v| v.version_id != version_id);
    versions.push(VersionRecord {
        version_id: version_id.clone(),
        data: Some(body),
        etag: etag.clone(),
        last_modified: Utc::now(),
    });

    let mut resp = StatusCode::OK.into_response();
    insert_header(&mut resp, "etag", &format!("\"{etag}\""));
    if versioned {
        insert_header(&mut resp, "x-amz-version-id", &version_id);
    }
    Ok(resp)
}

fn get_object(
    state: &MockState,
    bucket: &str,
    key: &str,
    version_id: Option<&str>,
    head: bool,
) -> S3Result {
    let inner = state.lock();
    let b = inner
        .buckets
        .get(bucket)
        .ok_or_else(|| S3Err::no_such_bucket(bucket))?;
    let versions = b.objects.get(key).filter(|v| !v.is_empty());
    let no_such_key = || S3Err::new(StatusCode::NOT_FOUND, "NoSuchKey", "The specified key does not exist.");

    let v = match version_id {
        Some(id) => versions
            .and_then(|vs| vs.iter().find(|v| v.version_id == id))
            .ok_or_else(|| {
                S3Err::new(
                    StatusCode::NOT_FOUND,
                    "NoSuchVersion",
                    "The specified version does not exist.",
                )
            })?,
        None => versions.and_then(|vs| vs.last()).ok_or_else(no_such_key)?,
    };

    let Some(data) = &v.data else {
        let mut e = match version_id {
            Some(_) => S3Err::new(
                StatusCode::METHOD_NOT_ALLOWED,
                "MethodNotAllowed",
                "The specified method is not allowed against this resource.",
            ),
            None => no_such_key(),
        };
        e.headers.push(("x-amz-delete-marker", "true".into()));
        e.headers.push(("x-amz-version-id", v.version_id.clone()));
        return Err(e);
    };

    let mut resp = if head {
        StatusCode::OK.into_response()
    } else {
        (StatusCode::OK, data.clone()).into_response()
    };
    insert_header(&mut resp, "etag", &format!("\"{}\"", v.etag));
    insert_header(
        &mut resp,
        "last-modified",
        &v.last_modified.format("%a, %d %b %Y %H:%M:%S GMT").to_string(),
    );
    insert_header(&mut resp, "content-type", "application/octet-stream");
    if head {
        insert_header(&mut resp, "content-length", &data.len().to_string());
    }
    if b.is_versioned() {
        insert_header(&mut resp, "x-amz-version-id", &v.version_id);
    }
    Ok(resp)
}

fn delete_object(state: &MockState, bucket: &str, key: &str, version_id: Option<&str>) -> S3Result {
    let mut inner = state.lock();
    let new_id = inner.next_id();
    let b = inner
        .buckets
        .get_mut(bucket)
        .ok_or_else(|| S3Err::no_such_bucket(bucket))?;
    let versioning = b.versioning.clone();
    let mut resp = StatusCode::NO_CONTENT.into_response();

    match (version_id, versioning.as_deref()) {
        (Some(id), _) => {
            let Some(versions) = b.objects.get_mut(key) else {
                return Ok(resp);
            };
            if let Some(pos) = versions.iter().position(|v| v.version_id == id) {
                let removed = versions.remove(pos);
                if removed.data.is_none() {
                    insert_header(&mut resp, "x-amz-delete-marker", "true");
                }
                insert_header(&mut resp, "x-amz-version-id", id);
            }
            if versions.is_empty() {
                b.objects.remove(key);
            }
        }
        (None, None) => {
            b.objects.remove(key);
        }
        (None, Some(status)) => {
            let marker_id = if status == "Enabled" {
                new_id
            } else {
                NULL_VERSION.to_string()
            };
            let versions = b.objects.entry(key.to_string()).or_default();
            versions.retain(|v| v.version_id != marker_id);
            versions.push(VersionRecord {
                version_id: marker_id.clone(),
                data: None,
                etag: String::new(),
                last_modified: Utc::now(),
            });
            insert_header(&mut resp, "x-amz-delete-marker", "true");
            insert_header(&mut resp, "x-amz-version-id", &marker_id);
        }
    }
    Ok(resp)
}

fn s3_error(
    state: &MockState,
    method: &Method,
    status: StatusCode,
    code: &str,
    message: String,
    resource: &str,
) -> Response {
    let request_id = state.lock().next_id();
    if *method == Method::HEAD {
        let mut resp = status.into_response();
        insert_header(&mut resp, "x-amz-request-id", &request_id);
        return resp;
    }
    xml_response(
        status,
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><Error><Code>{code}</Code>\
             <Message>{}</Message><Resource>{}</Resource><RequestId>{request_id}</RequestId></Error>",
            xml_escape(&message),
            xml_escape(resource)
        ),
    )
}

// ----------------------------------------------------------------------
// helpers

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

fn insert_header(resp: &mut Response, name: &'static str, value: &str) {
    if let Ok(v) = HeaderValue::from_str(value) {
        resp.headers_mut().insert(name, v);
    }
}

fn parse_pairs(s: &str) -> Vec<(String, String)> {
    s.split('&')
        .filter(|p| !p.is_empty())
        .map(|p| {
            let (k, v) = p.split_once('=').unwrap_or((p, ""));
            let decode = |x: &str| {
                urlencoding::decode(&x.replace('+', " "))
                    .map(|d| d.into_owned())
                    .unwrap_or_else(|_| x.to_string())
            };
            (decode(k), decode(v))
        })
        .collect()
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn iso_millis(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn xml_response(status: StatusCode, xml: String) -> Response {
    (status, [(http::header::CONTENT_TYPE, "application/xml")], xml).into_response()
}

fn json_response(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}
