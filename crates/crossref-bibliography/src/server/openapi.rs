//! OpenAPI description of the HTTP surface.

use std::sync::LazyLock;

use serde_json::{Value, json};

/// Built on first request and shared for the life of the process.
static DOCUMENT: LazyLock<Value> = LazyLock::new(build);

/// The OpenAPI 3 document.
#[must_use]
pub fn document() -> &'static Value {
    &DOCUMENT
}

fn search_term_parameter() -> Value {
    json!({
        "name": "search_term",
        "in": "query",
        "required": true,
        "description": "Free-text query sent to Crossref",
        "schema": {"type": "string"}
    })
}

fn outcome_schema(item: Value) -> Value {
    json!({
        "type": "object",
        "required": ["kind", "value"],
        "properties": {
            "kind": {"type": "string", "enum": ["item", "diagnostic"]},
            "value": {"oneOf": [item, {"type": "string", "description": "Diagnostic message"}]}
        }
    })
}

fn list_response(description: &str, item: Value) -> Value {
    json!({
        "200": {
            "description": description,
            "content": {
                "application/json": {
                    "schema": {"type": "array", "items": outcome_schema(item)}
                }
            }
        }
    })
}

fn build() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "Bibliography Generator",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Democratizing access to scientific research with natural language using Crossref and Zotero"
        },
        "servers": [{"url": "/"}],
        "paths": {
            "/freetext_to_crossref_items/": {
                "get": {
                    "operationId": "freetext_to_crossref_items",
                    "summary": "Search Crossref and return the raw metadata records",
                    "parameters": [search_term_parameter()],
                    "responses": list_response(
                        "Metadata records, best match first",
                        json!({"$ref": "#/components/schemas/MetadataRecord"})
                    )
                }
            },
            "/crossref_items_to_dois/": {
                "get": {
                    "operationId": "crossref_items_to_dois",
                    "summary": "Search Crossref and return the DOIs of the hits",
                    "parameters": [search_term_parameter()],
                    "responses": list_response("DOIs, best match first", json!({"type": "string"}))
                }
            },
            "/freetext_to_bibtex/": {
                "get": {
                    "operationId": "freetext_to_bibtex",
                    "summary": "Search Crossref and return BibTeX citations for the hits",
                    "parameters": [search_term_parameter()],
                    "responses": list_response(
                        "Citations, best match first",
                        json!({"$ref": "#/components/schemas/Citation"})
                    )
                }
            },
            "/add_bibtex_to_zotero/": {
                "post": {
                    "operationId": "add_bibtex_to_zotero",
                    "summary": "Add BibTeX entries to a Zotero collection",
                    "requestBody": {
                        "required": true,
                        "content": {
                            "application/json": {
                                "schema": {"$ref": "#/components/schemas/ForwardRequest"}
                            }
                        }
                    },
                    "responses": {
                        "200": {
                            "description": "Status message",
                            "content": {
                                "application/json": {
                                    "schema": {"$ref": "#/components/schemas/Message"}
                                }
                            }
                        }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "MetadataRecord": {
                    "type": "object",
                    "description": "Crossref works item; unknown fields are passed through",
                    "additionalProperties": true,
                    "properties": {
                        "DOI": {"type": "string"},
                        "type": {"type": "string"},
                        "title": {"type": "array", "items": {"type": "string"}},
                        "publisher": {"type": "string"},
                        "short-container-title": {"type": "array", "items": {"type": "string"}},
                        "score": {"type": "number"}
                    }
                },
                "Citation": {
                    "type": "object",
                    "required": ["ENTRYTYPE", "ID", "bibtex", "source"],
                    "properties": {
                        "ENTRYTYPE": {"type": "string"},
                        "ID": {"type": "string"},
                        "publisher": {"type": "string"},
                        "year": {"type": "string"},
                        "doi": {"type": "string"},
                        "title": {"type": "string"},
                        "journal": {"type": "string"},
                        "author": {"type": "string"},
                        "bibtex": {"type": "string"},
                        "source": {"type": "string", "enum": ["crossref_transform", "field_mapping"]}
                    }
                },
                "ForwardRequest": {
                    "type": "object",
                    "required": ["api_key", "library_id", "collection_id", "bibtex", "user"],
                    "properties": {
                        "api_key": {"type": "string"},
                        "library_id": {"type": "string"},
                        "collection_id": {"type": "string"},
                        "bibtex": {"type": "string"},
                        "user": {"type": "string", "description": "\"user\" or \"group\" library"}
                    }
                },
                "Message": {
                    "type": "object",
                    "required": ["message"],
                    "properties": {"message": {"type": "string"}}
                }
            }
        }
    })
}
