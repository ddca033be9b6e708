use std::io::{self, BufRead, Write};

use anyhow::Result;

use karuta::cards::scheduler::interval_days;
use karuta::cards::ReviewQuality;

use crate::app::App;

pub async fn run(app: &mut App, deck: Option<&str>) -> Result<()> {
    let ws = &mut app.workspace;
    if ws.review.start(&ws.cards, deck).is_none() {
        println!("No cards due for review.");
        return Ok(());
    }

    let prompt = format!(
        "(a)gain +{}d  (h)ard +{}d  (g)ood +{}d  (e)asy +{}d  (s)kip  (q)uit > ",
        interval_days(ReviewQuality::Again),
        interval_days(ReviewQuality::Hard),
        interval_days(ReviewQuality::Good),
        interval_days(ReviewQuality::Easy),
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    'cards: loop {
        let Some(card) = ws.review.session().and_then(|s| s.current_card()).cloned() else {
            break;
        };
        let progress = ws.review.session().map(|s| s.progress());
        let Some(progress) = progress else { break };

        println!();
        println!("[{}/{}] {}", progress.current, progress.total, card.front);

        let sides = card.hidden_sides();
        if sides.is_empty() {
            println!("(no back side)");
        }
        for side in &sides {
            print!("  ... Enter to reveal ");
            io::stdout().flush()?;
            if lines.next().is_none() {
                break 'cards;
            }
            println!("{}", side);
        }

        loop {
            print!("{}", prompt);
            io::stdout().flush()?;
            let Some(line) = lines.next() else {
                break 'cards;
            };
            let quality = match line?.trim().chars().next() {
                Some('a') => ReviewQuality::Again,
                Some('h') => ReviewQuality::Hard,
                Some('g') => ReviewQuality::Good,
                Some('e') => ReviewQuality::Easy,
                Some('s') => {
                    ws.review.skip();
                    continue 'cards;
                }
                Some('q') => break 'cards,
                _ => continue,
            };
            ws.review.answer(&mut ws.cards, quality).await?;
            println!("  {} (next in {}d)", quality.as_str(), interval_days(quality));
            continue 'cards;
        }
    }

    if let Some(session) = ws.review.session() {
        let elapsed = (chrono::Utc::now() - session.started_at()).num_seconds();
        println!();
        println!(
            "Session over: {} correct, {} incorrect in {}s.",
            session.correct_count(),
            session.incorrect_count(),
            elapsed
        );
    }
    ws.review.end();
    Ok(())
}
