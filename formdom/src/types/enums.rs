#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tag {
    #[default]
    Div,
    Form,
    Input,
    TextArea,
    Select,
    Button,
}

impl Tag {
    /// Listed form controls, i.e. what ends up in a form's element collection.
    pub fn is_control(self) -> bool {
        matches!(
            self,
            Tag::Input | Tag::TextArea | Tag::Select | Tag::Button
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tag::Div => "div",
            Tag::Form => "form",
            Tag::Input => "input",
            Tag::TextArea => "textarea",
            Tag::Select => "select",
            Tag::Button => "button",
        }
    }
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputType {
    #[default]
    Text,
    Number,
    Date,
    Checkbox,
    Radio,
    Email,
    Password,
    Hidden,
    Submit,
}

impl InputType {
    pub fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Number => "number",
            InputType::Date => "date",
            InputType::Checkbox => "checkbox",
            InputType::Radio => "radio",
            InputType::Email => "email",
            InputType::Password => "password",
            InputType::Hidden => "hidden",
            InputType::Submit => "submit",
        }
    }
}

impl std::fmt::Display for InputType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
