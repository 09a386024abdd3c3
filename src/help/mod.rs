use serde::Serialize;
use tinytemplate::TinyTemplate;

static USER_HELP: &str = include_str!("user.html");
static OWNER_HELP: &str = include_str!("owner.html");

#[derive(Clone)]
pub struct HelpContainer {
    user: String,
    owner: String,
}

impl HelpContainer {
    pub fn user_instructions(&self) -> String {
        self.user.clone()
    }

    pub fn owner_panel(&self) -> String {
        self.owner.clone()
    }
}

#[derive(Serialize, Clone)]
pub struct Context {
    pub bot_name: String,
}

pub fn render_help_messages(context: Context) -> Result<HelpContainer, tinytemplate::error::Error> {
    let mut tt = TinyTemplate::new();
    tt.add_template("user", USER_HELP)?;
    tt.add_template("owner", OWNER_HELP)?;
    Ok(HelpContainer {
        user: tt.render("user", &context)?,
        owner: tt.render("owner", &context)?,
    })
}

#[cfg(test)]
mod tests {
    use super::{render_help_messages, Context};

    #[test]
    fn help_messages_render_with_the_bot_name() {
        let container = render_help_messages(Context { bot_name: "confession_bot".to_owned() })
            .expect("the embedded templates must render");
        assert!(container.user_instructions().contains("@confession_bot"));
        assert!(container.owner_panel().contains("/addgroup"));
        assert!(container.owner_panel().contains("/graph"));
    }
}
