pub mod conflict;
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

/// Bookings: stays in a room that must never overlap.
pub struct BookingsModule {
    state: AppState,
}

impl BookingsModule {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Module for BookingsModule {
    fn name(&self) -> &'static str {
        "bookings"
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "bookings module initialized"
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
                        "summary": "List bookings",
                        "tags": ["Bookings"],
                        "parameters": [
                            { "name": "page", "in": "query", "schema": { "type": "integer", "minimum": 1 } },
                            { "name": "page_size", "in": "query", "schema": { "type": "integer", "minimum": 1 } }
                        ],
                        "responses": {
                            "200": {
                                "description": "One page of bookings, oldest first",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/BookingPage" }
                                    }
                                }
                            },
                            "404": { "description": "Page out of range" }
                        }
                    },
                    "post": {
                        "summary": "Book a room",
                        "tags": ["Bookings"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookingInput" }
                                }
                            }
                        },
                        "responses": {
                            "201": {
                                "description": "Created booking",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Booking" }
                                    }
                                }
                            },
                            "400": { "description": "Body is not a JSON object" },
                            "422": {
                                "description": "Field errors, an empty or reversed interval (invalid_interval), or an overlap with another booking of the room (room_unavailable)",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/ErrorResponse" }
                                    }
                                }
                            }
                        }
                    }
                },
                "/{id}": {
                    "parameters": [
                        { "name": "id", "in": "path", "required": true, "schema": { "type": "string", "format": "uuid" } }
                    ],
                    "get": {
                        "summary": "Retrieve a booking",
                        "tags": ["Bookings"],
                        "responses": {
                            "200": {
                                "description": "Booking",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Booking" }
                                    }
                                }
                            },
                            "404": { "description": "No such booking" }
                        }
                    },
                    "put": {
                        "summary": "Replace a booking",
                        "tags": ["Bookings"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookingInput" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated booking",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Booking" }
                                    }
                                }
                            },
                            "404": { "description": "No such booking" },
                            "422": { "description": "Validation or conflict" }
                        }
                    },
                    "patch": {
                        "summary": "Change some fields of a booking",
                        "tags": ["Bookings"],
                        "requestBody": {
                            "required": true,
                            "content": {
                                "application/json": {
                                    "schema": { "$ref": "#/components/schemas/BookingPatch" }
                                }
                            }
                        },
                        "responses": {
                            "200": {
                                "description": "Updated booking",
                                "content": {
                                    "application/json": {
                                        "schema": { "$ref": "#/components/schemas/Booking" }
                                    }
                                }
                            },
                            "404": { "description": "No such booking" },
                            "422": { "description": "Validation or conflict" }
                        }
                    },
                    "delete": {
                        "summary": "Cancel a booking",
                        "tags": ["Bookings"],
                        "responses": {
                            "204": { "description": "Deleted" },
                            "404": { "description": "No such booking" }
                        }
                    }
                },
                "/health": {
                    "get": {
                        "summary": "Bookings health check",
                        "tags": ["Bookings"],
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
                    "Booking": {
                        "type": "object",
                        "properties": {
                            "id": { "type": "string", "format": "uuid" },
                            "room": { "type": "string", "format": "uuid" },
                            "check_in": { "type": "string", "format": "date-time" },
                            "check_out": { "type": "string", "format": "date-time" },
                            "created_at": { "type": "string", "format": "date-time" },
                            "updated_at": { "type": "string", "format": "date-time" }
                        },
                        "required": ["id", "room", "check_in", "check_out", "created_at", "updated_at"]
                    },
                    "BookingInput": {
                        "type": "object",
                        "properties": {
                            "room": { "type": "string", "format": "uuid" },
                            "check_in": { "type": "string", "format": "date-time" },
                            "check_out": { "type": "string", "format": "date-time", "description": "Exclusive; must be after check_in" }
                        },
                        "required": ["room", "check_in", "check_out"]
                    },
                    "BookingPatch": {
                        "type": "object",
                        "properties": {
                            "room": { "type": "string", "format": "uuid" },
                            "check_in": { "type": "string", "format": "date-time" },
                            "check_out": { "type": "string", "format": "date-time" }
                        }
                    },
                    "BookingPage": {
                        "type": "object",
                        "properties": {
                            "count": { "type": "integer" },
                            "next": { "type": ["string", "null"] },
                            "previous": { "type": ["string", "null"] },
                            "results": {
                                "type": "array",
                                "items": { "$ref": "#/components/schemas/Booking" }
                            }
                        },
                        "required": ["count", "next", "previous", "results"]
                    }
                }
            }
        }))
    }

    /// Depends on the `room` table, so the rooms module must register first.
    fn migrations(&self) -> Vec<Migration> {
        vec![
            Migration {
                id: "001_create_booking",
                up: r#"
                    CREATE TABLE booking (
                        id         TEXT    PRIMARY KEY NOT NULL,
                        room_id    TEXT    NOT NULL REFERENCES room (room_id) ON DELETE CASCADE,
                        check_in   INTEGER NOT NULL,
                        check_out  INTEGER NOT NULL,
                        created_at INTEGER NOT NULL,
                        updated_at INTEGER NOT NULL,
                        CHECK (check_in < check_out)
                    );
                    CREATE INDEX booking_room_check_in ON booking (room_id, check_in);
                    CREATE INDEX booking_created_at ON booking (created_at, id);
                    "#,
            },
            Migration {
                id: "002_booking_overlap_guard",
                up: r#"
                    CREATE TRIGGER booking_overlap_insert
                    BEFORE INSERT ON booking
                    FOR EACH ROW
                    WHEN EXISTS (
                        SELECT 1 FROM booking
                        WHERE room_id = NEW.room_id
                          AND check_in < NEW.check_out
                          AND check_out > NEW.check_in
                    )
                    BEGIN
                        SELECT RAISE(ABORT, 'room_unavailable');
                    END;

                    CREATE TRIGGER booking_overlap_update
                    BEFORE UPDATE OF room_id, check_in, check_out ON booking
                    FOR EACH ROW
                    WHEN EXISTS (
                        SELECT 1 FROM booking
                        WHERE room_id = NEW.room_id
                          AND id <> OLD.id
                          AND check_in < NEW.check_out
                          AND check_out > NEW.check_in
                    )
                    BEGIN
                        SELECT RAISE(ABORT, 'room_unavailable');
                    END;
                    "#,
            },
        ]
    }

    async fn start(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "bookings module started");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "bookings module stopped");
        Ok(())
    }
}

/// Create a new instance of the bookings module
pub fn create_module(state: AppState) -> Arc<dyn Module> {
    Arc::new(BookingsModule::new(state))
}
