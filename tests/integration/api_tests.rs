//! End-to-end tests against a running server with a seeded database.
//!
//! Run with: cargo test --test api_tests -- --ignored

use rand::Rng;
use reqwest::{redirect::Policy, Client, StatusCode};
use serde_json::Value;

const BASE_URL: &str = "http://localhost:8080";
const PASSWORD: &str = "reading-list";

/// Client keeping the session cookie and following redirects like a browser
fn browser() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to build client")
}

fn unique_username() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("reader{}", suffix)
}

fn flash_messages(body: &Value) -> Vec<String> {
    body["flashes"]
        .as_array()
        .map(|flashes| {
            flashes
                .iter()
                .filter_map(|f| f["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

async fn signup(client: &Client, username: &str) -> Value {
    let response = client
        .post(format!("{}/signup", BASE_URL))
        .form(&[
            ("username", username),
            ("password", PASSWORD),
            ("first_name", "ada"),
            ("last_name", "lovelace"),
            ("email", "Ada@Example.com"),
            ("dob", "1815-12-10"),
        ])
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.expect("Failed to parse login page")
}

/// Sign up and log in a fresh user, returning the explore page
async fn logged_in(client: &Client) -> (String, Value) {
    let username = unique_username();
    signup(client, &username).await;

    let response = client
        .post(format!("{}/login", BASE_URL))
        .form(&[("username", username.as_str()), ("password", PASSWORD)])
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.url().path().ends_with("/explore"));
    let body = response.json().await.expect("Failed to parse explore page");
    (username, body)
}

#[tokio::test]
#[ignore]
async fn test_health_check() {
    let response = Client::new()
        .get(format!("{}/health", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_signup_then_login() {
    let client = browser();
    let username = unique_username();

    let login_page = signup(&client, &username).await;
    assert_eq!(
        flash_messages(&login_page),
        vec!["Signup successful. Please log in.".to_string()]
    );

    let response = client
        .post(format!("{}/login", BASE_URL))
        .form(&[("username", username.to_uppercase().as_str()), ("password", PASSWORD)])
        .send()
        .await
        .expect("Failed to send login request");
    assert_eq!(response.status(), StatusCode::OK);

    let explore: Value = response.json().await.expect("Failed to parse explore page");
    assert_eq!(explore["logged_in"], true);
    assert_eq!(explore["pagination"]["page"], 1);
}

#[tokio::test]
#[ignore]
async fn test_duplicate_username_conflicts() {
    let client = browser();
    let username = unique_username();
    signup(&client, &username).await;

    let response = client
        .post(format!("{}/signup", BASE_URL))
        .form(&[
            ("username", username.as_str()),
            ("password", PASSWORD),
            ("first_name", "Grace"),
            ("last_name", "Hopper"),
            ("email", "grace@example.com"),
        ])
        .send()
        .await
        .expect("Failed to send signup request");

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        flash_messages(&body),
        vec!["Username is already taken. Please choose another.".to_string()]
    );
}

#[tokio::test]
#[ignore]
async fn test_wrong_password_is_rejected() {
    let client = browser();
    let username = unique_username();
    signup(&client, &username).await;

    let response = client
        .post(format!("{}/login", BASE_URL))
        .form(&[("username", username.as_str()), ("password", "nope")])
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["logged_in"], false);
}

#[tokio::test]
#[ignore]
async fn test_login_returns_to_next() {
    let client = browser();
    let username = unique_username();
    signup(&client, &username).await;

    let response = client
        .post(format!("{}/login?next=%2Fmylist", BASE_URL))
        .form(&[("username", username.as_str()), ("password", PASSWORD)])
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.url().path(), "/mylist");
}

#[tokio::test]
#[ignore]
async fn test_external_next_is_ignored() {
    let client = Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
        .expect("Failed to build client");
    let username = unique_username();
    signup(&browser(), &username).await;

    let response = client
        .post(format!("{}/login?next=https%3A%2F%2Fevil.example%2F", BASE_URL))
        .form(&[("username", username.as_str()), ("password", PASSWORD)])
        .send()
        .await
        .expect("Failed to send login request");

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/explore");
}

#[tokio::test]
#[ignore]
async fn test_bookmark_toggle_and_list() {
    let client = browser();
    let (_, explore) = logged_in(&client).await;

    let book_id = explore["books"][0]["book_id"]
        .as_i64()
        .expect("Catalogue is empty, seed the books table");

    let response = client
        .get(format!("{}/bookmark/{}", BASE_URL, book_id))
        .header("Referer", format!("{}/book/{}", BASE_URL, book_id))
        .send()
        .await
        .expect("Failed to bookmark");
    assert_eq!(response.url().path(), format!("/book/{}", book_id));
    let book: Value = response.json().await.expect("Failed to parse book page");
    assert_eq!(book["book"]["is_bookmarked"], true);
    assert_eq!(
        flash_messages(&book),
        vec!["Bookmarked successfully!".to_string()]
    );

    let list: Value = client
        .get(format!("{}/mylist", BASE_URL))
        .send()
        .await
        .expect("Failed to load list")
        .json()
        .await
        .expect("Failed to parse list");
    assert_eq!(list["books"][0]["book_id"].as_i64(), Some(book_id));
    assert_eq!(list["pagination"]["total"], 1);

    let response = client
        .get(format!("{}/toggle_bookmark/{}", BASE_URL, book_id))
        .header("Referer", format!("{}/mylist", BASE_URL))
        .send()
        .await
        .expect("Failed to toggle bookmark");
    let list: Value = response.json().await.expect("Failed to parse list");
    assert_eq!(list["books"], Value::Array(vec![]));
    assert!(flash_messages(&list).is_empty());
}

#[tokio::test]
#[ignore]
async fn test_search_without_results_flashes() {
    let client = browser();
    logged_in(&client).await;

    let response = client
        .post(format!("{}/search", BASE_URL))
        .form(&[("search_query", "zzzz-no-such-book-zzzz")])
        .send()
        .await
        .expect("Failed to search");

    assert_eq!(response.url().path(), "/search");
    let body: Value = response.json().await.expect("Failed to parse search page");
    assert_eq!(
        flash_messages(&body),
        vec!["No results found. Please try a different search query.".to_string()]
    );
}

#[tokio::test]
#[ignore]
async fn test_profile_update_and_password_change() {
    let client = browser();
    let (username, _) = logged_in(&client).await;

    let profile: Value = client
        .get(format!("{}/profile", BASE_URL))
        .send()
        .await
        .expect("Failed to load profile")
        .json()
        .await
        .expect("Failed to parse profile");
    assert_eq!(profile["user"]["username"], username.as_str());
    assert_eq!(profile["user"]["first_name"], "Ada");
    assert_eq!(profile["user"]["email"], "ada@example.com");

    let response = client
        .post(format!("{}/update_profile", BASE_URL))
        .form(&[("updated_first_name", ""), ("updated_last_name", ""), ("updated_email", "")])
        .send()
        .await
        .expect("Failed to post profile");
    assert_eq!(response.url().path(), "/update_profile");

    let response = client
        .post(format!("{}/update_profile", BASE_URL))
        .form(&[("updated_last_name", "byron")])
        .send()
        .await
        .expect("Failed to post profile");
    assert_eq!(response.url().path(), "/profile");
    let profile: Value = response.json().await.expect("Failed to parse profile");
    assert_eq!(profile["user"]["last_name"], "Byron");
    assert_eq!(profile["user"]["first_name"], "Ada");

    let response = client
        .post(format!("{}/change_password", BASE_URL))
        .form(&[
            ("current_password", PASSWORD),
            ("new_password", "new-secret"),
            ("confirm_password", "different"),
        ])
        .send()
        .await
        .expect("Failed to change password");
    let body: Value = response.json().await.expect("Failed to parse form page");
    assert_eq!(
        flash_messages(&body),
        vec!["Passwords don't match, try again!".to_string()]
    );

    let response = client
        .post(format!("{}/change_password", BASE_URL))
        .form(&[
            ("current_password", PASSWORD),
            ("new_password", "new-secret"),
            ("confirm_password", "new-secret"),
        ])
        .send()
        .await
        .expect("Failed to change password");
    assert_eq!(response.url().path(), "/login");
    let body: Value = response.json().await.expect("Failed to parse login page");
    assert_eq!(body["logged_in"], false);

    let response = client
        .post(format!("{}/login", BASE_URL))
        .form(&[("username", username.as_str()), ("password", "new-secret")])
        .send()
        .await
        .expect("Failed to log in again");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.url().path(), "/explore");
}
