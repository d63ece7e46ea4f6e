//! Static OpenAPI 3 description served at `/openapi.json`.

use serde_json::{Value, json};

fn error_response(description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } }
    })
}

fn json_body(schema: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } } }
    })
}

fn ok(schema: &str, description: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": format!("#/components/schemas/{schema}") } } }
    })
}

fn mutation(summary: &str, request: &str, response: &str) -> Value {
    json!({
        "post": {
            "summary": summary,
            "security": [{ "bearer": [] }],
            "requestBody": json_body(request),
            "responses": {
                "200": ok(response, "Updated balance"),
                "400": error_response("Non-positive or missing amount"),
                "401": error_response("Missing, invalid or expired token"),
                "404": error_response("Account not found"),
                "422": error_response("Insufficient funds"),
                "429": error_response("Rate limit exceeded")
            }
        }
    })
}

pub fn document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "minibank",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "In-memory accounts with token-authenticated balance operations. Amounts are integer minor units."
        },
        "paths": {
            "/create_account": {
                "post": {
                    "summary": "Open an account",
                    "requestBody": json_body("CreateAccountRequest"),
                    "responses": {
                        "201": ok("CreatedAccount", "Account opened"),
                        "400": error_response("Invalid username, password, balance or currency"),
                        "409": error_response("Username already taken"),
                        "429": error_response("Rate limit exceeded")
                    }
                }
            },
            "/login": {
                "post": {
                    "summary": "Exchange credentials for a bearer token",
                    "requestBody": json_body("LoginRequest"),
                    "responses": {
                        "200": ok("Token", "Token issued"),
                        "401": error_response("Authentication failed"),
                        "429": error_response("Rate limit exceeded")
                    }
                }
            },
            "/deposit": mutation("Deposit into the caller's account", "AmountRequest", "Balance"),
            "/withdraw": mutation("Withdraw from the caller's account", "AmountRequest", "Balance"),
            "/transfer": mutation("Transfer from the caller's account", "TransferRequest", "TransferResult"),
            "/balance": {
                "get": {
                    "summary": "Current balance of the caller's account",
                    "security": [{ "bearer": [] }],
                    "responses": {
                        "200": ok("Account", "Account view"),
                        "401": error_response("Missing, invalid or expired token"),
                        "429": error_response("Rate limit exceeded")
                    }
                }
            },
            "/health": {
                "get": { "summary": "Liveness check", "responses": { "200": { "description": "OK" } } }
            },
            "/openapi.json": {
                "get": { "summary": "This document", "responses": { "200": { "description": "OpenAPI document" } } }
            }
        },
        "components": {
            "securitySchemes": {
                "bearer": { "type": "http", "scheme": "bearer", "bearerFormat": "JWT" }
            },
            "schemas": {
                "Error": {
                    "type": "object",
                    "required": ["error", "message"],
                    "properties": {
                        "error": { "type": "string", "example": "insufficient_funds" },
                        "message": { "type": "string" }
                    }
                },
                "CreateAccountRequest": {
                    "type": "object",
                    "required": ["username", "password"],
                    "properties": {
                        "username": { "type": "string" },
                        "password": { "type": "string", "format": "password" },
                        "initial_balance": { "type": "integer", "format": "int64", "minimum": 0, "default": 0 },
                        "currency": { "type": "string", "pattern": "^[A-Za-z]{3}$", "default": "USD" }
                    }
                },
                "LoginRequest": {
                    "type": "object",
                    "required": ["username", "password"],
                    "properties": {
                        "username": { "type": "string" },
                        "password": { "type": "string", "format": "password" }
                    }
                },
                "AmountRequest": {
                    "type": "object",
                    "required": ["amount"],
                    "properties": { "amount": { "type": "integer", "format": "int64", "minimum": 1 } }
                },
                "TransferRequest": {
                    "type": "object",
                    "required": ["to_account_id", "amount"],
                    "properties": {
                        "to_account_id": { "type": "integer", "format": "int64", "minimum": 1 },
                        "amount": { "type": "integer", "format": "int64", "minimum": 1 }
                    }
                },
                "CreatedAccount": {
                    "type": "object",
                    "properties": {
                        "account_id": { "type": "integer", "format": "int64" },
                        "balance": { "type": "integer", "format": "int64" },
                        "currency": { "type": "string" }
                    }
                },
                "Token": {
                    "type": "object",
                    "properties": {
                        "token": { "type": "string" },
                        "expires_at": { "type": "string", "format": "date-time" }
                    }
                },
                "Balance": {
                    "type": "object",
                    "properties": {
                        "account_id": { "type": "integer", "format": "int64" },
                        "balance": { "type": "integer", "format": "int64" }
                    }
                },
                "TransferResult": {
                    "type": "object",
                    "properties": {
                        "from_account_id": { "type": "integer", "format": "int64" },
                        "to_account_id": { "type": "integer", "format": "int64" },
                        "from_balance": { "type": "integer", "format": "int64" },
                        "to_balance": { "type": "integer", "format": "int64" }
                    }
                },
                "Account": {
                    "type": "object",
                    "properties": {
                        "account_id": { "type": "integer", "format": "int64" },
                        "username": { "type": "string" },
                        "balance": { "type": "integer", "format": "int64" },
                        "currency": { "type": "string" }
                    }
                }
            }
        }
    })
}
