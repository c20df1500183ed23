use serde_json::{json, Map, Value};

use crate::error::{Error, Result};

/// Controls when a mutation's effects become visible to subsequent reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Sync,
    Async,
    Deferred,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Sync => "sync",
            Visibility::Async => "async",
            Visibility::Deferred => "deferred",
        }
    }
}

/// One atomic document mutation within a batch.
///
/// The five kinds are a closed set; anything else is rejected at the type
/// level rather than at dispatch time.
#[derive(Clone, Debug, PartialEq)]
pub enum Transaction {
    Create(Value),
    CreateOrReplace(Value),
    CreateIfNotExists(Value),
    Patch { id: String, ops: Value },
    Delete { id: String },
}

impl Transaction {
    fn kind(&self) -> &'static str {
        match self {
            Transaction::Create(_) => "create",
            Transaction::CreateOrReplace(_) => "createOrReplace",
            Transaction::CreateIfNotExists(_) => "createIfNotExists",
            Transaction::Patch { .. } => "patch",
            Transaction::Delete { .. } => "delete",
        }
    }

    fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Transaction::Create(doc) => validate_document(doc, false),
            Transaction::CreateOrReplace(doc) | Transaction::CreateIfNotExists(doc) => {
                validate_document(doc, true)
            }
            Transaction::Patch { id, ops } => {
                if id.is_empty() {
                    return Err("patch requires a document id".to_string());
                }
                match ops.as_object() {
                    Some(map) if !map.is_empty() => Ok(()),
                    _ => Err("patch requires at least one operation".to_string()),
                }
            }
            Transaction::Delete { id } => {
                if id.is_empty() {
                    Err("delete requires a document id".to_string())
                } else {
                    Ok(())
                }
            }
        }
    }

    fn to_entry(&self) -> Value {
        match self {
            Transaction::Create(doc)
            | Transaction::CreateOrReplace(doc)
            | Transaction::CreateIfNotExists(doc) => {
                let mut entry = Map::new();
                entry.insert(self.kind().to_string(), doc.clone());
                Value::Object(entry)
            }
            Transaction::Patch { id, ops } => {
                let mut patch = Map::new();
                patch.insert("id".to_string(), Value::String(id.clone()));
                if let Some(map) = ops.as_object() {
                    for (name, value) in map {
                        patch.insert(name.clone(), value.clone());
                    }
                }
                json!({ "patch": Value::Object(patch) })
            }
            Transaction::Delete { id } => json!({ "delete": { "id": id } }),
        }
    }
}

fn validate_document(doc: &Value, require_id: bool) -> std::result::Result<(), String> {
    let Some(map) = doc.as_object() else {
        return Err("document must be a JSON object".to_string());
    };
    match map.get("_type") {
        Some(Value::String(kind)) if !kind.is_empty() => {}
        Some(_) => return Err("document _type must be a non-empty string".to_string()),
        None => return Err("document requires a _type".to_string()),
    }
    match map.get("_id") {
        Some(Value::String(id)) if !id.is_empty() => {}
        Some(_) => return Err("document _id must be a non-empty string".to_string()),
        None if require_id => return Err("document requires an _id".to_string()),
        None => {}
    }
    Ok(())
}

/// An ordered sequence of transactions plus the call options attached to the
/// mutation request. An empty batch is a valid no-op, not an error.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MutationBatch {
    pub transactions: Vec<Transaction>,
    pub return_ids: bool,
    pub return_documents: bool,
    pub visibility: Visibility,
    pub dry_run: bool,
}

impl MutationBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, transaction: Transaction) -> &mut Self {
        self.transactions.push(transaction);
        self
    }

    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }

    pub fn with_return_ids(mut self, return_ids: bool) -> Self {
        self.return_ids = return_ids;
        self
    }

    pub fn with_return_documents(mut self, return_documents: bool) -> Self {
        self.return_documents = return_documents;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Serialized mutation call: URL query pairs plus the JSON envelope.
#[derive(Clone, Debug, PartialEq)]
pub struct MutationCall {
    pub query_pairs: Vec<(String, String)>,
    pub body: Value,
}

/// Validate the batch and serialize it into the mutation envelope.
///
/// Transaction order is preserved exactly; later entries may reference ids
/// created by earlier ones. Validation fails fast on the first bad entry with
/// its index, before anything reaches the network.
pub fn build(batch: &MutationBatch) -> Result<MutationCall> {
    let mut entries = Vec::with_capacity(batch.transactions.len());
    for (index, transaction) in batch.transactions.iter().enumerate() {
        transaction
            .validate()
            .map_err(|reason| Error::InvalidTransaction { index, reason })?;
        entries.push(transaction.to_entry());
    }
    Ok(MutationCall {
        query_pairs: vec![
            ("returnIds".to_string(), bool_str(batch.return_ids)),
            ("returnDocuments".to_string(), bool_str(batch.return_documents)),
            ("visibility".to_string(), batch.visibility.as_str().to_string()),
            ("dryRun".to_string(), bool_str(batch.dry_run)),
        ],
        body: json!({ "mutations": entries }),
    })
}

fn bool_str(value: bool) -> String {
    if value { "true" } else { "false" }.to_string()
}
