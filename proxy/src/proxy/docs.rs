//! Static documentation served under `/questionnaire/docs`

pub(super) const DOCS_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>OSTrails Questionnaire Proxy</title>
<style>
body { font-family: system-ui, sans-serif; max-width: 52rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
code, pre { background: #f4f4f4; padding: 0.1rem 0.3rem; border-radius: 3px; }
pre { padding: 0.8rem; overflow-x: auto; }
h2 { border-bottom: 1px solid #ddd; padding-bottom: 0.2rem; }
</style>
</head>
<body>
<h1>OSTrails Questionnaire Proxy</h1>
<p>Submits assessment component records to FAIRsharing, GitHub and a FAIR Data Point
using credentials held by the service. Machine-readable description:
<a href="openapi.json">openapi.json</a>.</p>

<h2><code>GET /questionnaire/</code></h2>
<p>Health check. Returns <code>{"status":"ok","message":...,"version":...}</code>.</p>

<h2><code>POST /questionnaire/submit</code></h2>
<p>Body: JSON object with a non-empty <code>fairsharing_record</code> object.
Subject and domain IRIs are resolved to FAIRsharing ids when a GraphQL key is configured;
empty fields are removed before submission.</p>
<pre>{"fairsharing_record": {"name": "...", "subject_ids": ["http://..."]}}</pre>
<p>Responses: <code>200</code> with the FAIRsharing result, <code>502</code> with the failed result,
<code>400</code> for a malformed body.</p>

<h2><code>POST /questionnaire/push[?path=category/file.ttl]</code></h2>
<p>Body: Turtle (<code>text/turtle</code>). The record subject carrying
<code>dcterms:identifier</code> determines the repository path
<code>&lt;category&gt;/&lt;record_id&gt;.ttl</code> unless <code>path</code> is given.
The record is committed to GitHub, then registered with the FAIR Data Point.
Both results are always returned.</p>
<p>Responses: <code>200</code> both succeeded, <code>207</code> one succeeded,
<code>502</code> both failed, <code>400</code> for a malformed body.</p>

<h2>Result format</h2>
<pre>{"target": "github", "success": false, "status": 409, "error": "PublishError: ..."}</pre>
</body>
</html>
"#;

pub(super) const OPENAPI_JSON: &str = r##"{
  "openapi": "3.0.3",
  "info": {
    "title": "OSTrails Questionnaire Proxy",
    "description": "Credential-bridging proxy for FAIRsharing, GitHub and FAIR Data Point submissions."
  },
  "paths": {
    "/questionnaire/": {
      "get": {
        "summary": "Health check",
        "responses": {
          "200": { "description": "Service is running", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Health" } } } }
        }
      }
    },
    "/questionnaire/submit": {
      "post": {
        "summary": "Submit a record to FAIRsharing",
        "requestBody": {
          "required": true,
          "content": { "application/json": { "schema": { "$ref": "#/components/schemas/FairsharingSubmission" } } }
        },
        "responses": {
          "200": { "description": "Record accepted", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/SubmissionResult" } } } },
          "400": { "description": "Malformed record", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } } },
          "502": { "description": "FAIRsharing failure", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/SubmissionResult" } } } }
        }
      }
    },
    "/questionnaire/push": {
      "post": {
        "summary": "Commit a Turtle record to GitHub and register it with the FAIR Data Point",
        "parameters": [
          { "name": "path", "in": "query", "required": false, "schema": { "type": "string" }, "description": "Repository path overriding the one derived from the record" }
        ],
        "requestBody": {
          "required": true,
          "content": { "text/turtle": { "schema": { "type": "string" } } }
        },
        "responses": {
          "200": { "description": "Both targets succeeded", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/PushResponse" } } } },
          "207": { "description": "One target failed", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/PushResponse" } } } },
          "400": { "description": "Malformed record", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/Error" } } } },
          "502": { "description": "Both targets failed", "content": { "application/json": { "schema": { "$ref": "#/components/schemas/PushResponse" } } } }
        }
      }
    }
  },
  "components": {
    "schemas": {
      "Health": {
        "type": "object",
        "properties": { "status": { "type": "string" }, "message": { "type": "string" }, "version": { "type": "string" } }
      },
      "FairsharingSubmission": {
        "type": "object",
        "required": ["fairsharing_record"],
        "properties": { "fairsharing_record": { "type": "object" } }
      },
      "SubmissionResult": {
        "type": "object",
        "required": ["target", "success"],
        "properties": {
          "target": { "type": "string", "enum": ["fairsharing", "github", "fdp"] },
          "success": { "type": "boolean" },
          "status": { "type": "integer" },
          "body": {},
          "error": { "type": "string" }
        }
      },
      "PushResponse": {
        "type": "object",
        "properties": {
          "status": { "type": "string", "enum": ["success", "partial", "error"] },
          "results": { "type": "array", "items": { "$ref": "#/components/schemas/SubmissionResult" } }
        }
      },
      "Error": {
        "type": "object",
        "properties": { "status": { "type": "string" }, "kind": { "type": "string" }, "message": { "type": "string" } }
      }
    }
  }
}
"##;
