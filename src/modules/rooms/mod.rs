pub mod models;
pub mod payload;
pub mod repository;
pub mod routes;
pub mod views;

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use innkeep_kernel::{InitCtx, Migration, Module};

use crate::store::AppState;

/// Rooms: the bookable units and their nightly price.
pub struct RoomsModule {
    state: AppState,
}

impl RoomsModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for RoomsModule {
    fn name(&self) -> &'static str {
        "rooms"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "rooms module initialized"
        );
        Ok(())
    }

    fn routes(&self) -> Router {
        routes::router(self.state.clone())
    }

    fn openapi(&self) -> Option<serde_json::Value> {
        Some(serde_json::json!({
            "paths": {
                "/": {
                    "get": {
                        "summary": "List rooms",
                        "tags": ["Rooms"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "page_size", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of rooms, oldest first",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/RoomPage" }
                                    }
                                }
                            },
                            "404": {
                                "description": "Page out of range",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "post": {
                        "summary": "Create a room",
                        "tags": ["Rooms"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/RoomInput" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Identifier of the new room",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/RoomCreated" }
                                    }
                                }
                            },
                            "400": {
                                "description": "Body is not a JSON object",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            },
                            "422": {
                                "description": "Field validation failed",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{room_id}": {
                    "parameters": [
                        { "name": "room_id", "in": "path", "required": true, "schema": { "type": "string", "format": "uuid" } }
                    ],
                    "get": {
                        "summary": "Room with its bookings",
                        "tags": ["Rooms"],
                        "responses": {
                            "200": {
                                "description": "Room detail",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/RoomDetail" }
                                    }
                                }
                            },
                            "404": {
                                "description": "No such room",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    },
                    "put": {
                        "summary": "Replace a room",
                        "tags": ["Rooms"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/RoomInput" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated room",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Room" }
                                    }
                                }
                            },
                            "404": { "description": "No such room" },
                            "422": { "description": "Field validation failed" }
                        }
                    },
                    "patch": {
                        "summary": "Change some fields of a room",
                        "tags": ["Rooms"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/RoomPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated room",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Room" }
                                    }
                                }
                            },
                            "404": { "description": "No such room" },
                            "422": { "description": "Field validation failed" }
                        }
                    },
                    "delete": {
                        "summary": "Delete a room and all of its bookings",
                        "tags": ["Rooms"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": { "description": "No such room" }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Rooms health check",
                        "tags": ["Rooms"],
                        "responses": {
                            "200": {
                                "description": "OK",
                                "content": {
                                    "text/plain": {
                                        "schema": { "type": "string" }
                                    }
                                }
                            }
                        }
                    }
                }
            },
            "components": {
                "schemas": {
                    "Room": {
                        "type": "object",
                        "properties": {
                            "room_id": { "type": "string", "format": "uuid" },
                            "description": { "type": "string" },
                            "price": { "type": "string", "description": "Decimal with two places, e.g. \"100.00\"" },
                            "active": { "type": "boolean" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["room_id", "description", "price", "active", "created_at", "updated_at"]
                    },
                    "RoomDetail": {
                        "allOf": [
                            { "$ref": "#/components/schemas/Room" },
                            {
                                "type": "object",
                                "properties": {
                                    "bookings": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Booking" }
                                    }
                                },
                                "required": ["bookings"]
                            }
                        ]
                    },
                    "RoomCreated": {
                        "type": "object",
                        "properties": {
                            "room_id": { "type": "string", "format": "uuid" }
                        },
                        "required": ["room_id"]
                    },
                    "RoomInput": {
                        "type": "object",
                        "properties": {
                            "description": { "type": "string" },
                            "price": { "oneOf": [{ "type": "string" }, { "type": "number" }], "description": "Non-negative, at most 10 digits with 2 decimal places" },
                            "active": { "type": "boolean", "default": true }
                        },
                        "required": ["description", "price"]
                    },
                    "RoomPatch": {
                        "type": "object",
                        "properties": {
                            "description": { "type": "string" },
                            "price": { "oneOf": [{ "type": "string" }, { "type": "number" }] },
                            "active": { "type": "boolean" }
                        }
                    },
                    "RoomPage": {
                        "type": "object",
                        "properties": {
                            "count": { "type": "integer" },
                            "next": { "type": ["string", "null"] },
                            "previous": { "type": ["string", "null"] },
                            "results": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Room" }
                            }
                        },
                        "required": ["count", "next", "previous", "results"]
                    }
                }
            }
        }))
    }

    fn migrations(&self) -> Vec<Migration> {
        vec![Migration {
            id: "001_create_room",
            up: r#"
                CREATE TABLE room (
                    room_id     TEXT    PRIMARY KEY NOT NULL,
                    description TEXT    NOT NULL CHECK (length(trim(description)) > 0),
                    price       TEXT    NOT NULL,
                    active      INTEGER NOT NULL DEFAULT 1,
                    created_at  INTEGER NOT NULL,
                    updated_at  INTEGER NOT NULL
                );
                CREATE INDEX room_created_at ON room (created_at, room_id);
                "#,
        }]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "rooms module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "rooms module stopped");
        Ok(())
    }
}

/// Create a new instance of the rooms module
pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(RoomsModule::new(state))
}
