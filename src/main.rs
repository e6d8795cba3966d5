fn main() -> anyhow::Result<()> {
    tridosha::anatomy::viewer::run()
}
