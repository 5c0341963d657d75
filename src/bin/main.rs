use campus_assistant::{
    config::AssistantConfig,
    conversational::{Conversation, ConversationState},
    knowledge,
    models::{Message, MessageRole},
    selector::ResponseSelector,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn print_message(message: &Message) {
    match message.role {
        MessageRole::User => println!("{}: {}", message.role, message.text),
        MessageRole::Assistant => println!("\n🤖 {}\n", message.text),
    }
}

fn print_suggestions(selector: &ResponseSelector) {
    println!("Suggested Questions:");
    for q in selector.table().questions() {
        println!("  [{}] {} ({})", q.id, q.display_text, q.category);
    }
    println!("Type '/ask <id>' to pick one.\n");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();

    let config = AssistantConfig::from_env()?;

    // Logs go to stderr so they don't interleave with the chat
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    knowledge::ensure_valid()?;

    let selector = ResponseSelector::default();
    let conversation =
        Conversation::with_state(selector, config.typing_delay, ConversationState::with_welcome());
    info!(conversation_id = %conversation.id(), "Campus assistant started");

    for message in conversation.snapshot().await.messages() {
        print_message(message);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line == "/quit" || line == "/exit" {
            break;
        }

        let pending = if let Some(id) = line.strip_prefix("/ask ") {
            match conversation.select_suggestion(id.trim()).await {
                Ok(pending) => pending,
                Err(e) => {
                    warn!("{}", e);
                    println!("{}\n", e);
                    continue;
                }
            }
        } else {
            match conversation.submit(line).await {
                Some(pending) => pending,
                None => continue,
            }
        };

        println!("AI is typing...");
        let reply = pending.wait().await?;
        print_message(&reply);

        if conversation.snapshot().await.show_suggestions() {
            print_suggestions(&selector);
        }
    }

    conversation.cancel_pending().await;
    Ok(())
}
