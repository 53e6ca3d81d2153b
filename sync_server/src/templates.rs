//! Page templates a session can be created from.

use chrono::NaiveDate;
use widget_sync::widgets::{
    Datepicker, Dialog, DialogButton, Progressbar, Resizable, Slider, Sortable,
    dialog::BUTTON_CLICK_EVENT,
};
use widget_sync::{Page, Result};

pub type PageBuilder = fn() -> Result<Page>;

pub fn lookup(name: &str) -> Option<PageBuilder> {
    match name {
        "showcase" => Some(showcase),
        "blank" => Some(blank),
        _ => None,
    }
}

#[allow(clippy::unnecessary_wraps)]
fn blank() -> Result<Page> {
    Ok(Page::new())
}

fn confirm_title(date: NaiveDate) -> String {
    format!("Schedule for {}?", date.format("%A, %B %-d %Y"))
}

/// A slider mirrored into a progress bar, a resizable sortable list, a
/// datepicker and a confirmation dialog opened by picking a date.
fn showcase() -> Result<Page> {
    let mut page = Page::new();

    let mut volume = page.add("volume", Slider::new())?;
    volume.set_option("Min", 0)?;
    volume.set_option("Max", 100)?;
    volume.set_option("Value", 50)?;

    let mut level = page.add("level", Progressbar::new())?;
    level.set_option("Max", 100)?;
    level.set_option("Value", 50)?;

    page.on("volume", "change", |page, event| {
        let value = Slider::value(page.widget(&event.target)?);
        page.set_option("level", "Value", value)
    })?;

    page.add("tasks", Sortable::new())?
        .set_option("Axis", "y")?;
    page.attach("tasks", Resizable::new())?
        .set_option("Handles", "s")?;

    page.on("tasks", "update", |page, event| {
        let order = page.behavior::<Sortable>(&event.target)?.items();
        tracing::info!("task order is now {}", order.join(","));
        Ok(())
    })?;

    page.add("due", Datepicker::new())?
        .set_option("DateFormat", "yy-mm-dd")?;

    let mut confirm = page.add("confirm", Dialog::new())?;
    confirm.set_option("AutoOpen", false)?;
    confirm.set_option("Modal", true)?;
    confirm.set_option("Title", "Confirm")?;
    Dialog::add_button(&mut confirm, DialogButton::new("ok", "OK").primary())?;
    Dialog::add_button(&mut confirm, DialogButton::new("cancel", "Cancel").closes())?;

    page.on("due", "select", |page, event| {
        let Some(date) = Datepicker::date(page.widget(&event.target)?) else {
            return Ok(());
        };
        let mut confirm = page.widget_mut("confirm")?;
        confirm.set_option("Title", confirm_title(date))?;
        Dialog::open(&mut confirm)
    })?;

    page.on("confirm", BUTTON_CLICK_EVENT, |page, event| {
        let mut confirm = page.widget_mut(&event.target)?;
        if Dialog::clicked_button(confirm.widget()) == Some("ok") {
            tracing::info!("schedule confirmed");
        }
        Dialog::close(&mut confirm)
    })?;

    Ok(page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{OptionValue, Priority};
    use widget_sync::PostbackBuilder;

    fn rendered_showcase() -> Page {
        let mut page = showcase().unwrap();
        page.initial_render();
        page
    }

    #[test]
    fn test_lookup() {
        assert!(lookup("showcase").is_some());
        assert!(lookup("blank").is_some());
        assert!(lookup("missing").is_none());
    }

    #[test]
    fn test_showcase_initial_render() {
        let mut page = showcase().unwrap();
        let batch = page.initial_render();

        assert!(batch.instructions.iter().all(|i| i.is_init()));
        let targets: Vec<(&str, &str)> = batch
            .instructions
            .iter()
            .map(|i| (i.target.as_str(), i.operation.as_str()))
            .collect();
        assert_eq!(
            targets,
            vec![
                ("volume", "slider"),
                ("level", "progressbar"),
                ("tasks", "sortable"),
                ("tasks", "resizable"),
                ("due", "datepicker"),
                ("confirm", "dialog"),
            ]
        );
    }

    #[test]
    fn test_slider_change_mirrors_into_progressbar() {
        let mut page = rendered_showcase();
        let fields = PostbackBuilder::new()
            .feedback("volume", "_Value", "80")
            .event("volume", "change")
            .build();

        let batch = page.process_postback(fields).unwrap();

        assert_eq!(batch.instructions.len(), 1);
        assert_eq!(batch.instructions[0].target, "level");
        assert_eq!(batch.instructions[0].args[2], OptionValue::Integer(80));
    }

    #[test]
    fn test_picking_date_opens_confirmation() {
        let mut page = rendered_showcase();
        let fields = PostbackBuilder::new()
            .feedback("due", "_DateTime", "2024-07-04")
            .event("due", "select")
            .build();

        let batch = page.process_postback(fields).unwrap();

        let ops: Vec<Option<&str>> =
            batch.instructions.iter().map(|i| i.sub_operation()).collect();
        assert_eq!(ops, vec![Some("option"), Some("open")]);
        assert_eq!(
            batch.instructions[0].args[2],
            OptionValue::from("Schedule for Thursday, July 4 2024?")
        );
    }

    #[test]
    fn test_bad_date_reports_validation_and_keeps_dialog_closed() {
        let mut page = rendered_showcase();
        let fields = PostbackBuilder::new()
            .feedback("due", "_DateTime", "someday")
            .event("due", "select")
            .build();

        let batch = page.process_postback(fields).unwrap();

        assert!(batch.instructions.is_empty());
        assert!(batch.validation.contains_key("due"));
    }

    #[test]
    fn test_ok_closes_dialog_last() {
        let mut page = rendered_showcase();
        let fields = PostbackBuilder::new()
            .feedback("confirm", "_ClickedButton", "ok")
            .event("confirm", BUTTON_CLICK_EVENT)
            .build();

        let batch = page.process_postback(fields).unwrap();

        assert_eq!(batch.instructions.len(), 1);
        assert_eq!(batch.instructions[0].sub_operation(), Some("close"));
        assert_eq!(batch.instructions[0].priority, Priority::Last);
    }
}
